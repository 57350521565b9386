use serde::{Deserialize, Serialize};

pub mod board;
pub mod map;
pub mod session;

/// Number of inventory slots shown in the HUD; pickups beyond this are rejected.
pub const INVENTORY_CAPACITY: usize = 7;

/// Countdown value at level start.
pub const STARTING_TIME: i32 = 100;

/// Value the countdown wraps back to after going negative.
pub const TIME_WRAP: i32 = 100;

/// Represents a 2D grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Position { x, y }
    }

    /// Returns the neighboring position one step in `direction`, or `None`
    /// when the step would leave the non-negative coordinate space.
    pub fn step(&self, direction: Direction) -> Option<Position> {
        let (dx, dy) = direction.delta();
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        Some(Position { x, y })
    }
}

/// A single discrete move: one tile along exactly one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// The (dx, dy) offset of one step, with y growing downward.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Represents the color of a key or the lock on a door.
/// A door opens only for a key of the same color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyColor {
    Gold,
    Blue,
}

/// Items that can be carried in the player's inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Item {
    Key { color: KeyColor },
    Block,
}

impl Item {
    /// The color of the item, if it has one.
    pub fn color(&self) -> Option<KeyColor> {
        match self {
            Item::Key { color } => Some(*color),
            Item::Block => None,
        }
    }
}

/// The player's carried items, in collection order, bounded by the number
/// of HUD slots. Keys are never consumed; the only removal is a full clear
/// on level restart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    items: Vec<Item>,
}

impl Inventory {
    pub fn new() -> Self {
        Inventory { items: Vec::new() }
    }

    /// Appends `item` if a slot is free. Returns whether it was accepted.
    pub fn add(&mut self, item: Item) -> bool {
        if self.items.len() < INVENTORY_CAPACITY {
            self.items.push(item);
            true
        } else {
            false
        }
    }

    /// True if any held item carries the given color.
    pub fn has_color(&self, color: KeyColor) -> bool {
        self.items.iter().any(|item| item.color() == Some(color))
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= INVENTORY_CAPACITY
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    /// Empties every slot. Invoked on level restart.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}
