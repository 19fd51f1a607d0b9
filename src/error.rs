// A tiny error type so we don't rely on anyhow/thiserror.
// Every variant states *where* things went wrong.
use std::fmt::{self, Display};

#[derive(Debug)]
pub enum Error {
    WindowInit(String),         // Creating the window failed
    WindowUpdate(String),       // Pushing a frame to the window failed
    Config(String),             // Reading/parsing/writing the config file failed
    RenderLoop(String),         // Starting the render thread or its event loop failed
    SurfaceUnavailable(String), // No drawable frame target right now (transient)
}

impl Display for Error {
    // This decides how the error is printed to your console.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::WindowInit(s) => write!(f, "Window init error: {s}"),
            Error::WindowUpdate(s) => write!(f, "Window update error: {s}"),
            Error::Config(s) => write!(f, "Config error: {s}"),
            Error::RenderLoop(s) => write!(f, "Render loop error: {s}"),
            Error::SurfaceUnavailable(s) => write!(f, "Surface unavailable: {s}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(format!("parse: {e}"))
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::Config(format!("serialize: {e}"))
    }
}
