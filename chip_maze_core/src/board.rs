use serde::{Deserialize, Serialize};

use crate::{Direction, Inventory, Item, KeyColor, Position, map::Grid};

/// Represents the static ground layer of a cell.
///
/// `Empty` marks cells the level text left undefined; they are walkable but
/// carry no floor tile. Terrain never moves or changes during play.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Terrain {
    #[default]
    Empty,
    Floor,
    Wall,
    Water,
}

/// A tile sitting on top of the ground layer. At most one per cell, always
/// on floor; removed from the board when collected or unlocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Feature {
    Key { color: KeyColor },
    Door { color: KeyColor },
    Chip,
    Block,
}

/// Why a move was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    OutOfBounds,
    Wall,
    LockedDoor { color: KeyColor },
}

/// What a completed move did to the board, beyond moving the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveEvent {
    PickedUp(Item),
    UnlockedDoor(KeyColor),
    CollectedChip,
}

/// Represents the outcome of processing one discrete move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The move was refused; nothing on the board changed.
    Blocked(BlockReason),
    /// The player advanced one cell.
    Moved { event: Option<MoveEvent> },
    /// The player advanced one cell onto water.
    Drowned,
}

impl MoveOutcome {
    pub fn is_blocked(&self) -> bool {
        matches!(self, MoveOutcome::Blocked(_))
    }
}

/// Errors raised while parsing level text into a board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LevelError {
    #[error("level text contains no cells")]
    EmptyLevel,
    #[error("no player start ('P') found in level")]
    MissingPlayer,
    #[error("second player start found at ({}, {})", .second.x, .second.y)]
    MultiplePlayers { second: Position },
}

/// The full tile state of one level: ground layer, feature layer, and the
/// single player position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    terrain: Grid<Terrain>,
    features: Grid<Option<Feature>>,
    player: Position,
}

impl Board {
    pub fn width(&self) -> usize {
        self.terrain.width()
    }

    pub fn height(&self) -> usize {
        self.terrain.height()
    }

    pub fn player(&self) -> Position {
        self.player
    }

    pub fn terrain(&self) -> &Grid<Terrain> {
        &self.terrain
    }

    pub fn features(&self) -> &Grid<Option<Feature>> {
        &self.features
    }

    /// The feature at `position`, or `None` when the cell is bare or out of
    /// bounds.
    pub fn feature_at(&self, position: Position) -> Option<Feature> {
        self.features.get(position).copied().flatten()
    }

    /// Number of chips still on the board.
    pub fn chip_count(&self) -> u32 {
        self.features
            .enumerate()
            .filter(|(_, feature)| matches!(feature, Some(Feature::Chip)))
            .count() as u32
    }

    /// Processes one discrete move.
    ///
    /// Check-then-commit: the target cell is inspected first and any
    /// refusal (wall, edge of grid, locked door without a matching key)
    /// leaves the board and inventory untouched. Only a legal move mutates
    /// state, and a single invocation performs at most one pickup, unlock,
    /// or chip collection.
    ///
    /// Stepping onto water completes the move and reports [`MoveOutcome::Drowned`];
    /// hazards never block.
    pub fn apply_move(&mut self, direction: Direction, inventory: &mut Inventory) -> MoveOutcome {
        let Some(target) = self.player.step(direction) else {
            return MoveOutcome::Blocked(BlockReason::OutOfBounds);
        };
        if !self.terrain.contains(target) {
            return MoveOutcome::Blocked(BlockReason::OutOfBounds);
        }
        if self.terrain[target] == Terrain::Wall {
            return MoveOutcome::Blocked(BlockReason::Wall);
        }
        if let Some(Feature::Door { color }) = self.features[target] {
            if !inventory.has_color(color) {
                return MoveOutcome::Blocked(BlockReason::LockedDoor { color });
            }
        }

        self.player = target;

        let event = match self.features[target] {
            Some(Feature::Block) => self.collect(target, Item::Block, inventory),
            Some(Feature::Key { color }) => self.collect(target, Item::Key { color }, inventory),
            Some(Feature::Door { color }) => {
                // Matching key already verified above. The door opens and
                // leaves the board; the key stays in the inventory and
                // opens every later door of the same color.
                self.features[target] = None;
                Some(MoveEvent::UnlockedDoor(color))
            }
            Some(Feature::Chip) => {
                self.features[target] = None;
                Some(MoveEvent::CollectedChip)
            }
            None => None,
        };

        if self.terrain[target] == Terrain::Water {
            return MoveOutcome::Drowned;
        }
        MoveOutcome::Moved { event }
    }

    /// Transfers the feature at `position` into the inventory. With every
    /// slot taken the feature stays on the board, so a key can never be
    /// destroyed by a full inventory.
    fn collect(
        &mut self,
        position: Position,
        item: Item,
        inventory: &mut Inventory,
    ) -> Option<MoveEvent> {
        if inventory.add(item) {
            self.features[position] = None;
            Some(MoveEvent::PickedUp(item))
        } else {
            None
        }
    }
}

/// Parses level text into a board.
///
/// One line per row, one character per column; the width is the longest
/// line, shorter lines are padded with empty cells. Unrecognized characters
/// are silently ignored and leave the cell empty.
pub fn load_board_from_str(text: &str) -> Result<Board, LevelError> {
    let lines: Vec<&str> = text.lines().collect();
    let height = lines.len();
    let width = lines
        .iter()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0);
    if width == 0 || height == 0 {
        return Err(LevelError::EmptyLevel);
    }

    let mut terrain: Grid<Terrain> = Grid::new(width, height);
    let mut features: Grid<Option<Feature>> = Grid::new(width, height);
    let mut player: Option<Position> = None;

    for (y, line) in lines.iter().enumerate() {
        for (x, symbol) in line.chars().enumerate() {
            let position = Position::new(x, y);
            let (ground, feature) = match symbol {
                '#' => (Terrain::Wall, None),
                '.' => (Terrain::Floor, None),
                'W' => (Terrain::Water, None),
                'P' => {
                    if player.is_some() {
                        return Err(LevelError::MultiplePlayers { second: position });
                    }
                    player = Some(position);
                    (Terrain::Floor, None)
                }
                '{' => (Terrain::Floor, Some(Feature::Block)),
                'K' => (
                    Terrain::Floor,
                    Some(Feature::Key {
                        color: KeyColor::Gold,
                    }),
                ),
                'k' => (
                    Terrain::Floor,
                    Some(Feature::Key {
                        color: KeyColor::Blue,
                    }),
                ),
                'D' => (
                    Terrain::Floor,
                    Some(Feature::Door {
                        color: KeyColor::Gold,
                    }),
                ),
                'd' => (
                    Terrain::Floor,
                    Some(Feature::Door {
                        color: KeyColor::Blue,
                    }),
                ),
                '*' => (Terrain::Floor, Some(Feature::Chip)),
                _ => (Terrain::Empty, None),
            };
            terrain[position] = ground;
            features[position] = feature;
        }
    }

    let player = player.ok_or(LevelError::MissingPlayer)?;
    Ok(Board {
        terrain,
        features,
        player,
    })
}
