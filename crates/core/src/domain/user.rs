use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Permission role of the person talking to the assistant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Administrador,
    Vendedor,
    Almacenero,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Administrador, Role::Vendedor, Role::Almacenero];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Administrador => "administrador",
            Self::Vendedor => "vendedor",
            Self::Almacenero => "almacenero",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "administrador" | "admin" => Ok(Self::Administrador),
            "vendedor" => Ok(Self::Vendedor),
            "almacenero" | "almacen" => Ok(Self::Almacenero),
            other => Err(ConfigError::Validation(format!(
                "unsupported role `{other}` (expected administrador|vendedor|almacenero)"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationUser {
    pub id: i64,
    pub role: Role,
}

impl ConversationUser {
    pub fn new(id: i64, role: Role) -> Self {
        Self { id, role }
    }
}
