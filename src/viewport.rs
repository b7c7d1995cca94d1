use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Small viewport applied mid-capture to trigger responsive asset variants.
    pub fn mobile() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 800,
        }
    }
}

#[derive(Debug, Error)]
#[error("invalid viewport {input:?}: expected WIDTHxHEIGHT with positive dimensions (e.g., 1280x800)")]
pub struct ViewportParseError {
    input: String,
}

impl FromStr for Viewport {
    type Err = ViewportParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ViewportParseError {
            input: s.to_string(),
        };
        let (width, height) = s.split_once('x').ok_or_else(err)?;
        let width: u32 = width.trim().parse().map_err(|_| err())?;
        let height: u32 = height.trim().parse().map_err(|_| err())?;
        if width == 0 || height == 0 {
            return Err(err());
        }
        Ok(Viewport { width, height })
    }
}

impl std::fmt::Display for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
