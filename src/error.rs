use thiserror::Error;

/// Everything that can go wrong while bringing up or driving the hero scene.
///
/// None of these are fatal to the page: callers turn them into a hidden canvas.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("3D rendering is not supported here: {0}")]
    Unsupported(String),

    #[error("element not found: {0}")]
    MissingElement(&'static str),

    #[error("shader compile failed: {0}")]
    Shader(String),

    #[error("program link failed: {0}")]
    Program(String),

    #[error("could not allocate GL {0}")]
    Buffer(&'static str),

    #[error("invalid scene config: {0}")]
    Config(String),

    #[error("bad scene config JSON: {0}")]
    ConfigJson(#[from] serde_json::Error),

    #[error("host call failed: {0}")]
    Js(String),
}

pub type Result<T, E = SceneError> = std::result::Result<T, E>;

impl From<wasm_bindgen::JsValue> for SceneError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        SceneError::Js(format!("{value:?}"))
    }
}

impl From<SceneError> for wasm_bindgen::JsValue {
    fn from(err: SceneError) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}
