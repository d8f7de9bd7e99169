//! Layout Direction

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Direction in which the tree grows from the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutDirection {
    #[default]
    TopBottom,
    BottomTop,
    LeftRight,
    RightLeft,
}

impl LayoutDirection {
    pub const ALL: [LayoutDirection; 4] = [
        LayoutDirection::TopBottom,
        LayoutDirection::BottomTop,
        LayoutDirection::LeftRight,
        LayoutDirection::RightLeft,
    ];

    /// The primary axis (parent → child) is x.
    pub fn is_horizontal(self) -> bool {
        matches!(self, LayoutDirection::LeftRight | LayoutDirection::RightLeft)
    }

    /// Children are placed towards decreasing coordinates.
    pub fn is_reversed(self) -> bool {
        matches!(self, LayoutDirection::BottomTop | LayoutDirection::RightLeft)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LayoutDirection::TopBottom => "top-bottom",
            LayoutDirection::BottomTop => "bottom-top",
            LayoutDirection::LeftRight => "left-right",
            LayoutDirection::RightLeft => "right-left",
        }
    }
}

impl std::fmt::Display for LayoutDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LayoutDirection::ALL
            .into_iter()
            .find(|direction| direction.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown layout direction '{s}'"))
    }
}
