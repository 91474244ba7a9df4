use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Caller role carried in the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Employee,
    Moderator,
}

impl Role {
    pub const EMPLOYEE_CODE: i16 = 0;
    pub const MODERATOR_CODE: i16 = 1;

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Employee => "employee",
            Role::Moderator => "moderator",
        }
    }

    /// Exact, case-sensitive match on the wire literal.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "employee" => Some(Role::Employee),
            "moderator" => Some(Role::Moderator),
            _ => None,
        }
    }

    pub fn code(self) -> i16 {
        match self {
            Role::Employee => Self::EMPLOYEE_CODE,
            Role::Moderator => Self::MODERATOR_CODE,
        }
    }

    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            Self::EMPLOYEE_CODE => Some(Role::Employee),
            Self::MODERATOR_CODE => Some(Role::Moderator),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum City {
    #[serde(rename = "Москва")]
    Moscow,
    #[serde(rename = "Санкт-Петербург")]
    SaintPetersburg,
    #[serde(rename = "Казань")]
    Kazan,
}

impl City {
    pub const SAINT_PETERSBURG_CODE: i16 = 0;
    pub const KAZAN_CODE: i16 = 1;
    pub const MOSCOW_CODE: i16 = 2;

    pub fn as_str(self) -> &'static str {
        match self {
            City::Moscow => "Москва",
            City::SaintPetersburg => "Санкт-Петербург",
            City::Kazan => "Казань",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Москва" => Some(City::Moscow),
            "Санкт-Петербург" => Some(City::SaintPetersburg),
            "Казань" => Some(City::Kazan),
            _ => None,
        }
    }

    pub fn code(self) -> i16 {
        match self {
            City::SaintPetersburg => Self::SAINT_PETERSBURG_CODE,
            City::Kazan => Self::KAZAN_CODE,
            City::Moscow => Self::MOSCOW_CODE,
        }
    }

    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            Self::SAINT_PETERSBURG_CODE => Some(City::SaintPetersburg),
            Self::KAZAN_CODE => Some(City::Kazan),
            Self::MOSCOW_CODE => Some(City::Moscow),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceptionStatus {
    #[serde(rename = "in_progress")]
    Open,
    #[serde(rename = "close")]
    Closed,
}

impl ReceptionStatus {
    pub const OPEN_CODE: i16 = 0;
    pub const CLOSED_CODE: i16 = 1;

    pub fn code(self) -> i16 {
        match self {
            ReceptionStatus::Open => Self::OPEN_CODE,
            ReceptionStatus::Closed => Self::CLOSED_CODE,
        }
    }

    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            Self::OPEN_CODE => Some(ReceptionStatus::Open),
            Self::CLOSED_CODE => Some(ReceptionStatus::Closed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemType {
    #[serde(rename = "электроника")]
    Electronics,
    #[serde(rename = "одежда")]
    Clothes,
    #[serde(rename = "обувь")]
    Shoes,
}

impl ItemType {
    pub const ELECTRONICS_CODE: i16 = 0;
    pub const SHOES_CODE: i16 = 1;
    pub const CLOTHES_CODE: i16 = 2;

    pub fn as_str(self) -> &'static str {
        match self {
            ItemType::Electronics => "электроника",
            ItemType::Clothes => "одежда",
            ItemType::Shoes => "обувь",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "электроника" => Some(ItemType::Electronics),
            "одежда" => Some(ItemType::Clothes),
            "обувь" => Some(ItemType::Shoes),
            _ => None,
        }
    }

    pub fn code(self) -> i16 {
        match self {
            ItemType::Electronics => Self::ELECTRONICS_CODE,
            ItemType::Shoes => Self::SHOES_CODE,
            ItemType::Clothes => Self::CLOTHES_CODE,
        }
    }

    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            Self::ELECTRONICS_CODE => Some(ItemType::Electronics),
            Self::SHOES_CODE => Some(ItemType::Shoes),
            Self::CLOTHES_CODE => Some(ItemType::Clothes),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickupPoint {
    pub id: Uuid,
    pub registration_date: OffsetDateTime,
    pub city: City,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reception {
    pub id: Uuid,
    pub pvz_id: Uuid,
    pub date_time: OffsetDateTime,
    pub status: ReceptionStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: Uuid,
    pub reception_id: Uuid,
    pub date_time: OffsetDateTime,
    pub item_type: ItemType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}
