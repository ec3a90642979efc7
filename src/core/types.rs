//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Simulation time in seconds, supplied by the caller of `Classroom::tick`
pub type SimTime = f64;

/// Index of a child in the classroom's child list
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChildId(pub usize);

/// Index of a teacher in the classroom's teacher list
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TeacherId(pub usize);

/// Integer grid coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance. Agents never step diagonally, so this is the
    /// number of moves between two free cells.
    pub fn distance_to(&self, other: &Self) -> f64 {
        self.grid_distance(other) as f64
    }

    /// Widened so opposite corners of the `i32` plane do not overflow
    pub fn grid_distance(&self, other: &Self) -> u64 {
        u64::from(self.x.abs_diff(other.x)) + u64::from(self.y.abs_diff(other.y))
    }

    pub fn step(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self::new(self.x + dx, self.y + dy)
    }

    /// The four orthogonal neighbors, in `Direction::ALL` order
    pub fn neighbors(&self) -> [Position; 4] {
        Direction::ALL.map(|d| self.step(d))
    }

    /// Direction of a single orthogonal step from `self` to `other`
    pub fn direction_to(&self, other: &Self) -> Option<Direction> {
        Direction::ALL.into_iter().find(|d| self.step(*d) == *other)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Axis-aligned rectangle of cells, half-open on both axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Zone {
    pub x_min: i32,
    pub x_max: i32,
    pub y_min: i32,
    pub y_max: i32,
}

impl Zone {
    pub fn new(x_min: i32, x_max: i32, y_min: i32, y_max: i32) -> Self {
        Self { x_min, x_max, y_min, y_max }
    }

    /// Zone covering a whole `width` x `height` grid
    pub fn full(width: usize, height: usize) -> Self {
        Self::new(0, width as i32, 0, height as i32)
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.x_min && pos.x < self.x_max && pos.y >= self.y_min && pos.y < self.y_max
    }

    pub fn is_empty(&self) -> bool {
        self.x_min >= self.x_max || self.y_min >= self.y_max
    }

    pub fn area(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            ((self.x_max - self.x_min) * (self.y_max - self.y_min)) as usize
        }
    }

    /// True if every cell of the zone lies on a `width` x `height` grid
    pub fn fits_within(&self, width: usize, height: usize) -> bool {
        self.x_min >= 0
            && self.y_min >= 0
            && self.x_max <= width as i32
            && self.y_max <= height as i32
    }

    /// Integer midpoint of the zone
    pub fn center(&self) -> Position {
        Position::new((self.x_min + self.x_max - 1) / 2, (self.y_min + self.y_max - 1) / 2)
    }

    /// Cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        (self.y_min..self.y_max)
            .flat_map(move |y| (self.x_min..self.x_max).map(move |x| Position::new(x, y)))
    }
}

/// Orthogonal step direction (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Down,
    Right,
    Up,
    Left,
}

impl Direction {
    /// Neighbor iteration order used everywhere a stable order matters
    pub const ALL: [Direction; 4] =
        [Direction::Down, Direction::Right, Direction::Up, Direction::Left];

    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::Down => (0, 1),
            Direction::Right => (1, 0),
            Direction::Up => (0, -1),
            Direction::Left => (-1, 0),
        }
    }

    /// Dot product of this direction's unit vector with another's
    pub fn dot(&self, other: Direction) -> i32 {
        let (ax, ay) = self.offset();
        let (bx, by) = other.offset();
        ax * bx + ay * by
    }
}

/// Capture state of a child
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentState {
    /// Moving under its own strategy, may collect candy
    Free,
    /// Caught by a teacher and being escorted to the safe zone
    Captured,
}

/// Movement policy of a child
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    RandomWalk,
    CandySeeker,
    TeacherAvoidance,
    DirectionalBias,
    StrategicTiming,
    WallHugger,
    GroupSeeker,
    CandyHoarder,
    SafeZoneExplorer,
    /// Meta-strategy that periodically switches between the other nine
    Unpredictable,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 10] = [
        StrategyKind::RandomWalk,
        StrategyKind::CandySeeker,
        StrategyKind::TeacherAvoidance,
        StrategyKind::DirectionalBias,
        StrategyKind::StrategicTiming,
        StrategyKind::WallHugger,
        StrategyKind::GroupSeeker,
        StrategyKind::CandyHoarder,
        StrategyKind::SafeZoneExplorer,
        StrategyKind::Unpredictable,
    ];

    /// Every kind `Unpredictable` may switch to
    pub const CONCRETE: [StrategyKind; 9] = [
        StrategyKind::RandomWalk,
        StrategyKind::CandySeeker,
        StrategyKind::TeacherAvoidance,
        StrategyKind::DirectionalBias,
        StrategyKind::StrategicTiming,
        StrategyKind::WallHugger,
        StrategyKind::GroupSeeker,
        StrategyKind::CandyHoarder,
        StrategyKind::SafeZoneExplorer,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::RandomWalk => "random_walk",
            StrategyKind::CandySeeker => "candy_seeker",
            StrategyKind::TeacherAvoidance => "teacher_avoidance",
            StrategyKind::DirectionalBias => "directional_bias",
            StrategyKind::StrategicTiming => "strategic_timing",
            StrategyKind::WallHugger => "wall_hugger",
            StrategyKind::GroupSeeker => "group_seeker",
            StrategyKind::CandyHoarder => "candy_hoarder",
            StrategyKind::SafeZoneExplorer => "safe_zone_explorer",
            StrategyKind::Unpredictable => "unpredictable",
        }
    }
}

/// Content of a grid cell as seen by renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CellKind {
    #[default]
    Empty,
    SafeZone,
    Candy,
    Child,
    Teacher,
}

impl CellKind {
    /// Symbol used by the ASCII dump
    pub fn symbol(&self) -> char {
        match self {
            CellKind::Empty => '.',
            CellKind::SafeZone => 'S',
            CellKind::Candy => 'C',
            CellKind::Child => 'K',
            CellKind::Teacher => 'T',
        }
    }
}
