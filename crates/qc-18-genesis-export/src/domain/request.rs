use shared_types::Height;
use std::fmt;

use super::errors::ExportError;

/// Which state an export reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportHeight {
    /// The live working state of the running application.
    Latest,
    /// The version committed at this height.
    At(Height),
}

impl ExportHeight {
    /// Flag value meaning "latest".
    pub const LATEST_FLAG: i64 = -1;

    /// Parse the `--height` flag: `-1` is latest, anything `>= 1` a height.
    pub fn from_flag(flag: i64) -> Result<Self, ExportError> {
        match flag {
            Self::LATEST_FLAG => Ok(Self::Latest),
            h if h >= 1 => Ok(Self::At(h as Height)),
            other => Err(ExportError::ExportFailed(format!(
                "invalid export height {other}: use -1 for latest or a height >= 1"
            ))),
        }
    }
}

impl fmt::Display for ExportHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str("latest"),
            Self::At(h) => write!(f, "{h}"),
        }
    }
}

/// An already-parsed export request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub height: ExportHeight,
    pub for_zero_height: bool,
    /// Validators to jail during a zero-height export, as hex addresses.
    pub jail_allowed_addrs: Vec<String>,
}

impl ExportRequest {
    pub fn latest() -> Self {
        Self::new(ExportHeight::Latest)
    }

    pub fn at(height: Height) -> Self {
        Self::new(ExportHeight::At(height))
    }

    pub fn new(height: ExportHeight) -> Self {
        Self {
            height,
            for_zero_height: false,
            jail_allowed_addrs: Vec::new(),
        }
    }

    pub fn for_zero_height(mut self) -> Self {
        self.for_zero_height = true;
        self
    }

    pub fn with_jail<I, A>(mut self, addrs: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.jail_allowed_addrs = addrs.into_iter().map(Into::into).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_flag() {
        assert_eq!(ExportHeight::from_flag(-1).unwrap(), ExportHeight::Latest);
        assert_eq!(ExportHeight::from_flag(3).unwrap(), ExportHeight::At(3));
        assert!(matches!(
            ExportHeight::from_flag(0),
            Err(ExportError::ExportFailed(_))
        ));
        assert!(ExportHeight::from_flag(-7).is_err());
    }

    #[test]
    fn test_request_builder() {
        let request = ExportRequest::at(4).for_zero_height().with_jail(["ABCD"]);
        assert_eq!(request.height, ExportHeight::At(4));
        assert!(request.for_zero_height);
        assert_eq!(request.jail_allowed_addrs, vec!["ABCD".to_string()]);
    }
}
