use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone)]
pub struct AnalysisResponse {
    pub result: String,
    pub suspicious: bool,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct Location {
    pub x: String,
    pub y: String,
    pub z: String,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct SceneAnalysisResponse {
    pub result: String,
    pub suspicious: bool,
    pub location: Location,
    pub timestamp: String,
}
