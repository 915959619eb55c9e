use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A cell coordinate on the world grid.
///
/// Ordered so that `BTreeMap<GridCoord, _>` iterates deterministically
/// across platforms. Displays as `"x,y"`, the key format the original
/// client protocol used.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
}

impl GridCoord {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev (chessboard) distance to another coordinate.
    pub fn chebyshev(&self, other: GridCoord) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

impl std::fmt::Display for GridCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Opaque wallet-style address identifying a player.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub String);

impl ActorId {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What occupies a tile.
///
/// Serialized as the lowercase names the original wire format used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileType {
    Empty,
    Axite,
    Gold,
    Crystal,
    Structure,
    Obelisk,
    Lore,
}

impl TileType {
    /// Fixed loot amount awarded when a tile of this kind depletes.
    pub fn loot_amount(self) -> u32 {
        match self {
            TileType::Crystal => 1,
            TileType::Axite => 2,
            TileType::Gold => 2,
            TileType::Obelisk => 10,
            _ => 1,
        }
    }

    /// Whether this kind can hold remaining durability.
    pub fn is_resource(self) -> bool {
        matches!(
            self,
            TileType::Axite | TileType::Gold | TileType::Crystal | TileType::Obelisk
        )
    }
}

impl std::fmt::Display for TileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TileType::Empty => "empty",
            TileType::Axite => "axite",
            TileType::Gold => "gold",
            TileType::Crystal => "crystal",
            TileType::Structure => "structure",
            TileType::Obelisk => "obelisk",
            TileType::Lore => "lore",
        };
        f.write_str(name)
    }
}

/// Player-built structure attached to a tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Structure {
    pub id: Uuid,
    pub kind: StructureKind,
    pub level: u8,
    pub owner: ActorId,
}

impl Structure {
    /// A fresh level-1 extractor, the only kind placement creates.
    pub fn extractor(owner: ActorId) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: StructureKind::Extractor,
            level: 1,
            owner,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureKind {
    Extractor,
    Beacon,
    Turret,
}

/// One cell of the world grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub coord: GridCoord,
    pub kind: TileType,
    pub durability: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<Structure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<ActorId>,
}

impl Tile {
    /// An empty tile with no durability.
    pub fn empty(coord: GridCoord) -> Self {
        Self {
            coord,
            kind: TileType::Empty,
            durability: 0,
            structure: None,
            owner: None,
        }
    }

    /// A resource tile of the given kind and durability.
    pub fn resource(coord: GridCoord, kind: TileType, durability: u16) -> Self {
        debug_assert!(kind.is_resource());
        Self {
            coord,
            kind,
            durability,
            structure: None,
            owner: None,
        }
    }

    /// Whether this tile can currently be mined.
    pub fn minable(&self) -> bool {
        self.durability > 0
    }
}

/// Loot emitted when a resource tile depletes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loot {
    #[serde(rename = "type")]
    pub kind: TileType,
    pub amount: u32,
}

impl Loot {
    /// The fixed payout for a depleted tile of the given kind.
    pub fn for_kind(kind: TileType) -> Self {
        Self {
            kind,
            amount: kind.loot_amount(),
        }
    }
}
