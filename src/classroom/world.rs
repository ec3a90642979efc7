//! Classroom - the main world state container

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::agents::{Agent, Child, Teacher};
use crate::classroom::cell::{Cell, Occupant};
use crate::core::config::ClassroomConfig;
use crate::core::error::{ClassroomError, Result};
use crate::core::types::{CellKind, ChildId, Position, SimTime, StrategyKind, TeacherId, Zone};
use crate::spatial::Grid;

/// The classroom: grid, agents, escort links and the run's random source
pub struct Classroom {
    pub(crate) config: ClassroomConfig,
    pub(crate) cells: Grid<Cell>,
    pub(crate) safe_zone: Zone,
    pub(crate) children: Vec<Child>,
    pub(crate) teachers: Vec<Teacher>,
    /// Teacher -> the captured child it is walking back to the safe zone
    pub(crate) escorts: BTreeMap<TeacherId, ChildId>,
    pub(crate) candy_count: usize,
    pub(crate) last_candy_spawn: SimTime,
    /// Random number generator (deterministic)
    pub(crate) rng: ChaCha8Rng,
    pub(crate) time: SimTime,
    pub(crate) tick_count: u64,
}

impl Classroom {
    /// Build a classroom and its starting population from a config
    pub fn from_config(config: ClassroomConfig) -> Result<Self> {
        let mut classroom = Self::empty(config)?;
        crate::classroom::placement::populate(&mut classroom)?;
        tracing::info!(
            width = classroom.width(),
            height = classroom.height(),
            children = classroom.children.len(),
            teachers = classroom.teachers.len(),
            seed = classroom.config.seed,
            "Classroom ready"
        );
        Ok(classroom)
    }

    /// Validated grid and safe zone with no agents or candy yet
    pub fn empty(config: ClassroomConfig) -> Result<Self> {
        config.validate()?;

        let mut cells: Grid<Cell> = Grid::new(config.width, config.height);
        for pos in config.safe_zone.cells() {
            if let Some(cell) = cells.get_mut(pos) {
                cell.safe = true;
            }
        }

        Ok(Self {
            safe_zone: config.safe_zone,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            cells,
            children: Vec::new(),
            teachers: Vec::new(),
            escorts: BTreeMap::new(),
            candy_count: 0,
            last_candy_spawn: 0.0,
            time: 0.0,
            tick_count: 0,
        })
    }

    /// Put a child on a vacant, candy-free cell
    pub fn add_child(&mut self, position: Position, kind: StrategyKind) -> Result<ChildId> {
        self.check_vacant("child", position)?;
        if self.has_candy(position) {
            return Err(ClassroomError::InvalidPlacement {
                what: "child",
                position,
                reason: "cell holds candy",
            });
        }

        let id = ChildId(self.children.len());
        let child = Child::new(id, position, kind, &self.config.timing, &mut self.rng, self.time);
        self.children.push(child);
        self.set_occupant(position, Some(Occupant::Child(id)));
        Ok(id)
    }

    /// Put a teacher on a vacant cell with a fixed patrol zone
    pub fn add_teacher(&mut self, position: Position, zone: Zone) -> Result<TeacherId> {
        self.check_vacant("teacher", position)?;
        if zone.is_empty() || !zone.fits_within(self.width(), self.height()) {
            return Err(ClassroomError::InvalidConfig(format!(
                "teacher zone {:?} must be non-empty and inside the grid",
                zone
            )));
        }

        let id = TeacherId(self.teachers.len());
        let priority = self.config.teachers.strategy_priority.clone();
        self.teachers.push(Teacher::new(id, position, zone, priority));
        self.set_occupant(position, Some(Occupant::Teacher(id)));
        Ok(id)
    }

    /// Drop a candy on an empty cell outside the safe zone
    pub fn place_candy(&mut self, position: Position) -> Result<()> {
        self.check_vacant("candy", position)?;
        let reason = if self.is_position_safe_zone(position) {
            Some("cell is in the safe zone")
        } else if self.has_candy(position) {
            Some("cell already holds candy")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(ClassroomError::InvalidPlacement {
                what: "candy",
                position,
                reason,
            });
        }

        if let Some(cell) = self.cells.get_mut(position) {
            cell.candy = true;
        }
        self.candy_count += 1;
        Ok(())
    }

    fn check_vacant(&self, what: &'static str, position: Position) -> Result<()> {
        match self.cells.get(position) {
            None => Err(ClassroomError::InvalidPlacement {
                what,
                position,
                reason: "out of bounds",
            }),
            Some(cell) if !cell.is_vacant() => Err(ClassroomError::InvalidPlacement {
                what,
                position,
                reason: "cell is occupied",
            }),
            Some(_) => Ok(()),
        }
    }

    // === QUERIES ===

    pub fn width(&self) -> usize {
        self.cells.width
    }

    pub fn height(&self) -> usize {
        self.cells.height
    }

    pub fn config(&self) -> &ClassroomConfig {
        &self.config
    }

    /// Time passed to the most recent tick
    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn safe_zone(&self) -> Zone {
        self.safe_zone
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    pub fn teachers(&self) -> &[Teacher] {
        &self.teachers
    }

    pub fn child(&self, id: ChildId) -> Option<&Child> {
        self.children.get(id.0)
    }

    pub fn teacher(&self, id: TeacherId) -> Option<&Teacher> {
        self.teachers.get(id.0)
    }

    /// The child a teacher is currently escorting
    pub fn escort_of(&self, teacher: TeacherId) -> Option<ChildId> {
        self.escorts.get(&teacher).copied()
    }

    /// The teacher escorting a child, if it is captured
    pub fn escorting_teacher(&self, child: ChildId) -> Option<TeacherId> {
        self.escorts.iter().find(|(_, c)| **c == child).map(|(t, _)| *t)
    }

    pub fn cell_kind(&self, pos: Position) -> Option<CellKind> {
        self.cells.get(pos).map(Cell::kind)
    }

    pub fn is_position_safe_zone(&self, pos: Position) -> bool {
        self.safe_zone.contains(pos)
    }

    pub fn has_candy(&self, pos: Position) -> bool {
        self.cells.get(pos).is_some_and(|c| c.candy)
    }

    /// Candy positions in row-major order
    pub fn candies(&self) -> Vec<Position> {
        self.cells.iter().filter(|(_, c)| c.candy).map(|(p, _)| p).collect()
    }

    pub fn candy_count(&self) -> usize {
        self.candy_count
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        self.cells.in_bounds(pos)
    }

    /// In bounds and no agent on it
    pub fn is_vacant(&self, pos: Position) -> bool {
        self.cells.get(pos).is_some_and(Cell::is_vacant)
    }

    /// Read-only view handed to agents when they decide a move
    pub fn view(&self) -> WorldView<'_> {
        WorldView::new(
            &self.config,
            &self.cells,
            self.safe_zone,
            &self.children,
            &self.teachers,
            &self.escorts,
        )
    }

    // === MUTATION (used by the tick phases) ===

    fn set_occupant(&mut self, pos: Position, occupant: Option<Occupant>) {
        if let Some(cell) = self.cells.get_mut(pos) {
            cell.occupant = occupant;
        }
    }

    /// A single orthogonal step onto a vacant in-bounds cell
    pub(crate) fn is_legal_step(&self, from: Position, to: Position) -> bool {
        from.grid_distance(&to) == 1 && self.is_vacant(to)
    }

    pub(crate) fn move_child(&mut self, id: ChildId, to: Position) {
        let from = self.children[id.0].position();
        self.set_occupant(from, None);
        self.set_occupant(to, Some(Occupant::Child(id)));
        self.children[id.0].move_to(to);
    }

    pub(crate) fn move_teacher(&mut self, id: TeacherId, to: Position) {
        let from = self.teachers[id.0].position();
        self.set_occupant(from, None);
        self.set_occupant(to, Some(Occupant::Teacher(id)));
        self.teachers[id.0].move_to(to);
    }

    /// Remove a candy from the grid, returning whether one was there
    pub(crate) fn take_candy(&mut self, pos: Position) -> bool {
        match self.cells.get_mut(pos) {
            Some(cell) if cell.candy => {
                cell.candy = false;
                self.candy_count -= 1;
                true
            }
            _ => false,
        }
    }
}

/// Read-only view of the classroom
///
/// Built from individual field borrows so the world can hand it to an agent
/// while lending its random number generator mutably at the same time.
#[derive(Clone, Copy)]
pub struct WorldView<'a> {
    config: &'a ClassroomConfig,
    cells: &'a Grid<Cell>,
    safe_zone: Zone,
    children: &'a [Child],
    teachers: &'a [Teacher],
    escorts: &'a BTreeMap<TeacherId, ChildId>,
}

impl<'a> WorldView<'a> {
    pub(crate) fn new(
        config: &'a ClassroomConfig,
        cells: &'a Grid<Cell>,
        safe_zone: Zone,
        children: &'a [Child],
        teachers: &'a [Teacher],
        escorts: &'a BTreeMap<TeacherId, ChildId>,
    ) -> Self {
        Self {
            config,
            cells,
            safe_zone,
            children,
            teachers,
            escorts,
        }
    }

    pub fn config(&self) -> &'a ClassroomConfig {
        self.config
    }

    pub fn width(&self) -> usize {
        self.cells.width
    }

    pub fn height(&self) -> usize {
        self.cells.height
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        self.cells.in_bounds(pos)
    }

    /// In bounds and no agent on it
    pub fn is_vacant(&self, pos: Position) -> bool {
        self.cells.get(pos).is_some_and(Cell::is_vacant)
    }

    pub fn has_candy(&self, pos: Position) -> bool {
        self.cells.get(pos).is_some_and(|c| c.candy)
    }

    /// Candy positions in row-major order
    pub fn candies(&self) -> Vec<Position> {
        self.cells.iter().filter(|(_, c)| c.candy).map(|(p, _)| p).collect()
    }

    pub fn is_safe(&self, pos: Position) -> bool {
        self.safe_zone.contains(pos)
    }

    pub fn safe_zone(&self) -> Zone {
        self.safe_zone
    }

    /// Safe-zone cell closest to `pos`
    pub fn nearest_safe_cell(&self, pos: Position) -> Position {
        Position::new(
            pos.x.clamp(self.safe_zone.x_min, self.safe_zone.x_max - 1),
            pos.y.clamp(self.safe_zone.y_min, self.safe_zone.y_max - 1),
        )
    }

    /// Steps from `pos` to the nearest safe-zone cell (0 inside it)
    pub fn distance_to_safe_zone(&self, pos: Position) -> u64 {
        pos.grid_distance(&self.nearest_safe_cell(pos))
    }

    pub fn children(&self) -> &'a [Child] {
        self.children
    }

    pub fn teachers(&self) -> &'a [Teacher] {
        self.teachers
    }

    pub fn child(&self, id: ChildId) -> Option<&'a Child> {
        self.children.get(id.0)
    }

    pub fn escort_of(&self, teacher: TeacherId) -> Option<ChildId> {
        self.escorts.get(&teacher).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ChildCounts;

    fn small_config() -> ClassroomConfig {
        let mut config = ClassroomConfig {
            width: 10,
            height: 10,
            safe_zone: Zone::new(0, 4, 0, 4),
            children: ChildCounts::none(),
            ..ClassroomConfig::default()
        };
        config.teachers.count = 0;
        config
    }

    #[test]
    fn test_grid_initialization() {
        let classroom = Classroom::empty(small_config()).unwrap();
        assert_eq!(classroom.width(), 10);
        assert_eq!(classroom.height(), 10);
        assert!(classroom.children().is_empty());
        assert!(classroom.teachers().is_empty());
    }

    #[test]
    fn test_safe_zone_setup() {
        let classroom = Classroom::empty(small_config()).unwrap();
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(classroom.cell_kind(Position::new(x, y)), Some(CellKind::SafeZone));
            }
        }
        assert_eq!(classroom.cell_kind(Position::new(4, 4)), Some(CellKind::Empty));
    }

    #[test]
    fn test_is_position_safe_zone() {
        let classroom = Classroom::empty(small_config()).unwrap();
        assert!(classroom.is_position_safe_zone(Position::new(2, 2)));
        assert!(!classroom.is_position_safe_zone(Position::new(5, 5)));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = small_config();
        config.safe_zone = Zone::new(0, 11, 0, 2);
        assert!(matches!(
            Classroom::empty(config),
            Err(ClassroomError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_placement_on_occupied_cell_fails() {
        let mut classroom = Classroom::empty(small_config()).unwrap();
        classroom
            .add_child(Position::new(5, 5), StrategyKind::RandomWalk)
            .unwrap();
        let err = classroom
            .add_teacher(Position::new(5, 5), Zone::full(10, 10))
            .unwrap_err();
        assert!(matches!(err, ClassroomError::InvalidPlacement { .. }));
        assert!(classroom.add_child(Position::new(10, 0), StrategyKind::RandomWalk).is_err());
    }

    #[test]
    fn test_candy_placement_rules() {
        let mut classroom = Classroom::empty(small_config()).unwrap();
        assert!(classroom.place_candy(Position::new(1, 1)).is_err());
        classroom.place_candy(Position::new(6, 6)).unwrap();
        assert!(classroom.place_candy(Position::new(6, 6)).is_err());
        assert_eq!(classroom.candies(), vec![Position::new(6, 6)]);
        assert_eq!(classroom.candy_count(), 1);
        assert_eq!(classroom.cell_kind(Position::new(6, 6)), Some(CellKind::Candy));
    }

    #[test]
    fn test_view_nearest_safe_cell() {
        let classroom = Classroom::empty(small_config()).unwrap();
        let view = classroom.view();
        assert_eq!(view.nearest_safe_cell(Position::new(8, 2)), Position::new(3, 2));
        assert_eq!(view.nearest_safe_cell(Position::new(1, 1)), Position::new(1, 1));
        assert_eq!(view.distance_to_safe_zone(Position::new(6, 6)), 6);
        assert_eq!(view.distance_to_safe_zone(Position::new(0, 0)), 0);
    }

    #[test]
    fn test_move_updates_grid() {
        let mut classroom = Classroom::empty(small_config()).unwrap();
        let id = classroom
            .add_child(Position::new(5, 5), StrategyKind::RandomWalk)
            .unwrap();
        assert!(classroom.is_legal_step(Position::new(5, 5), Position::new(5, 6)));
        assert!(!classroom.is_legal_step(Position::new(5, 5), Position::new(6, 6)));

        classroom.move_child(id, Position::new(5, 6));
        assert_eq!(classroom.cell_kind(Position::new(5, 5)), Some(CellKind::Empty));
        assert_eq!(classroom.cell_kind(Position::new(5, 6)), Some(CellKind::Child));
        let child = classroom.child(id).unwrap();
        assert_eq!(child.previous_position(), Position::new(5, 5));
    }
}
