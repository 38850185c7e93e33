use std::convert::Infallible;

/// Outcome of one pipeline stage.
///
/// `Fallback` carries a usable value produced by a degraded path (canned
/// prompt, fallback image, no image), so callers can tell it apart from the
/// primary path without treating it as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage<T, E = Infallible> {
    Ok(T),
    Fallback(T),
    Err(E),
}

impl<T, E> Stage<T, E> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Stage::Fallback(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Ok(_) => "ok",
            Stage::Fallback(_) => "fallback",
            Stage::Err(_) => "err",
        }
    }

    /// Collapse `Ok` and `Fallback` into a plain result.
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Stage::Ok(v) | Stage::Fallback(v) => Ok(v),
            Stage::Err(e) => Err(e),
        }
    }
}

impl<T> Stage<T, Infallible> {
    /// Stages that degrade instead of failing always have a value.
    pub fn into_value(self) -> T {
        match self {
            Stage::Ok(v) | Stage::Fallback(v) => v,
            Stage::Err(never) => match never {},
        }
    }
}

impl<T, E> From<Result<T, E>> for Stage<T, E> {
    fn from(r: Result<T, E>) -> Self {
        match r {
            Ok(v) => Stage::Ok(v),
            Err(e) => Stage::Err(e),
        }
    }
}
