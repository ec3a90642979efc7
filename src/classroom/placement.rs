//! Initial population of a classroom built from config

use crate::classroom::world::Classroom;
use crate::core::config::ClassroomConfig;
use crate::core::error::{ClassroomError, Result};
use crate::core::types::{Position, StrategyKind, Zone};

/// Patrol zone for each teacher
///
/// Configured zones are used as given. Otherwise the grid is cut into equal
/// vertical strips, one per teacher, the last strip absorbing the remainder.
pub fn teacher_zones(config: &ClassroomConfig) -> Vec<Zone> {
    if !config.teachers.zones.is_empty() {
        return config.teachers.zones.clone();
    }

    let n = config.teachers.count;
    let (w, h) = (config.width, config.height);
    (0..n)
        .map(|i| Zone::new((i * w / n) as i32, ((i + 1) * w / n) as i32, 0, h as i32))
        .collect()
}

/// The first `count` starting cells
///
/// Safe-zone cells come first in row-major order, then the remaining cells
/// ordered by distance to the safe zone with row-major tie-breaks.
pub fn starting_cells(config: &ClassroomConfig, count: usize) -> Vec<Position> {
    let safe = config.safe_zone;
    let mut cells: Vec<Position> = safe.cells().take(count).collect();
    if cells.len() == count {
        return cells;
    }

    let mut overflow: Vec<Position> = Zone::full(config.width, config.height)
        .cells()
        .filter(|p| !safe.contains(*p))
        .collect();
    overflow.sort_by_key(|p| (distance_to_zone(*p, safe), p.y, p.x));

    cells.extend(overflow.into_iter().take(count - cells.len()));
    cells
}

fn distance_to_zone(pos: Position, zone: Zone) -> u64 {
    let nearest = Position::new(
        pos.x.clamp(zone.x_min, zone.x_max - 1),
        pos.y.clamp(zone.y_min, zone.y_max - 1),
    );
    pos.grid_distance(&nearest)
}

/// Place every configured teacher and child, teachers first
pub(crate) fn populate(classroom: &mut Classroom) -> Result<()> {
    let config = classroom.config().clone();
    let zones = teacher_zones(&config);
    let mut cells = starting_cells(&config, config.total_agents()).into_iter();

    let mut next_cell = || {
        cells.next().ok_or_else(|| {
            ClassroomError::InvalidConfig(format!(
                "no room to place {} agents on a {}x{} grid",
                config.total_agents(),
                config.width,
                config.height
            ))
        })
    };

    for zone in zones {
        let pos = next_cell()?;
        classroom.add_teacher(pos, zone)?;
    }

    for kind in StrategyKind::ALL {
        for _ in 0..config.children.count(kind) {
            let pos = next_cell()?;
            classroom.add_child(pos, kind)?;
        }
    }

    Ok(())
}
