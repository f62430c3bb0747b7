// Constant alien and weapon tables shared by the generator and the oracle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Alien species. Stats are fixed per species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlienType {
    Swift,
    Regular,
    Boss,
}

impl AlienType {
    pub const ALL: [AlienType; 3] = [AlienType::Swift, AlienType::Regular, AlienType::Boss];

    pub fn hp(self) -> i64 {
        match self {
            AlienType::Swift => 1,
            AlienType::Regular => 2,
            AlienType::Boss => 3,
        }
    }

    pub fn atk(self) -> i64 {
        match self {
            AlienType::Swift => 2,
            AlienType::Regular => 3,
            AlienType::Boss => 3,
        }
    }
}

impl fmt::Display for AlienType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlienType::Swift => write!(f, "swift"),
            AlienType::Regular => write!(f, "regular"),
            AlienType::Boss => write!(f, "boss"),
        }
    }
}

/// Purchasable weapon. Stats and prices are fixed per weapon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WeaponType {
    Turret,
    MachineGun,
    RayGun,
}

impl WeaponType {
    pub const ALL: [WeaponType; 3] = [WeaponType::Turret, WeaponType::MachineGun, WeaponType::RayGun];

    pub fn atk(self) -> i64 {
        match self {
            WeaponType::Turret => 1,
            WeaponType::MachineGun => 3,
            WeaponType::RayGun => 5,
        }
    }

    pub fn cost(self) -> i64 {
        match self {
            WeaponType::Turret => 10,
            WeaponType::MachineGun => 30,
            WeaponType::RayGun => 50,
        }
    }
}

impl fmt::Display for WeaponType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeaponType::Turret => write!(f, "turret"),
            WeaponType::MachineGun => write!(f, "machineGun"),
            WeaponType::RayGun => write!(f, "rayGun"),
        }
    }
}
