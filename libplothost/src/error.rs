use std::error::Error as StdError;
use std::fmt;

/// `PlotHostResult<T>` provides a simplified result type with a common error type
pub type PlotHostResult<T> = std::result::Result<T, ErrorWrapper>;

/// PlotHostError defines all the internal errors that `libplothost` might return
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum PlotHostError {
    HookRegistration(String),
    HookRemoval(String),
    InvalidHostWindow(isize),
    WindowQuery(String),
    Unsupported,
}
impl std::error::Error for PlotHostError {}
impl fmt::Display for PlotHostError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            PlotHostError::HookRegistration(ref err) => write!(f, "activation hook registration failed: {}", err),
            PlotHostError::HookRemoval(ref err) => write!(f, "activation hook removal failed: {}", err),
            PlotHostError::InvalidHostWindow(ref err) => write!(f, "invalid host window was given: {:#x}", err),
            PlotHostError::WindowQuery(ref err) => write!(f, "window query {} failed", err),
            PlotHostError::Unsupported => write!(f, "window embedding is only supported on windows"),
        }
    }
}

/// ErrorWrapper provides wrapper around all the underlying library dependencys that `libplothost`
/// uses such that we can easily surface all errors from `libplothost` in a single easy way.
#[derive(Debug)]
pub enum ErrorWrapper {
    PlotHost(PlotHostError),

    // std::string::FromUtf16Error
    Utf16(std::string::FromUtf16Error),

    // windows errors
    #[cfg(windows)]
    Win32(windows::core::Error),
}
impl ErrorWrapper {
    /// Implemented directly on the `Error` type to reduce casting required
    pub fn is<T: StdError + 'static>(&self) -> bool {
        self.as_ref().is::<T>()
    }

    /// Implemented directly on the `Error` type to reduce casting required
    pub fn downcast_ref<T: StdError + 'static>(&self) -> Option<&T> {
        self.as_ref().downcast_ref::<T>()
    }

    /// Implemented directly on the `Error` type to reduce casting required
    pub fn downcast_mut<T: StdError + 'static>(&mut self) -> Option<&mut T> {
        self.as_mut().downcast_mut::<T>()
    }
}
impl StdError for ErrorWrapper {}

impl fmt::Display for ErrorWrapper {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ErrorWrapper::PlotHost(ref err) => write!(f, "{}", err),
            ErrorWrapper::Utf16(ref err) => write!(f, "{}", err),
            #[cfg(windows)]
            ErrorWrapper::Win32(ref err) => write!(f, "{}", err),
        }
    }
}

impl AsRef<dyn StdError> for ErrorWrapper {
    fn as_ref(&self) -> &(dyn StdError + 'static) {
        match *self {
            ErrorWrapper::PlotHost(ref err) => err,
            ErrorWrapper::Utf16(ref err) => err,
            #[cfg(windows)]
            ErrorWrapper::Win32(ref err) => err,
        }
    }
}

impl AsMut<dyn StdError> for ErrorWrapper {
    fn as_mut(&mut self) -> &mut (dyn StdError + 'static) {
        match *self {
            ErrorWrapper::PlotHost(ref mut err) => err,
            ErrorWrapper::Utf16(ref mut err) => err,
            #[cfg(windows)]
            ErrorWrapper::Win32(ref mut err) => err,
        }
    }
}

impl From<PlotHostError> for ErrorWrapper {
    fn from(err: PlotHostError) -> ErrorWrapper {
        ErrorWrapper::PlotHost(err)
    }
}

impl From<std::string::FromUtf16Error> for ErrorWrapper {
    fn from(err: std::string::FromUtf16Error) -> ErrorWrapper {
        ErrorWrapper::Utf16(err)
    }
}

// windows errors
//--------------------------------------------------------------------------------------------------
#[cfg(windows)]
impl From<windows::core::Error> for ErrorWrapper {
    fn from(err: windows::core::Error) -> ErrorWrapper {
        ErrorWrapper::Win32(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors() {
        let mut err = ErrorWrapper::from(PlotHostError::HookRegistration("access denied".to_owned()));
        assert!(err.is::<PlotHostError>());
        assert!(!err.is::<std::string::FromUtf16Error>());
        assert_eq!(err.to_string(), "activation hook registration failed: access denied");
        assert_eq!(
            err.downcast_ref::<PlotHostError>(),
            Some(&PlotHostError::HookRegistration("access denied".to_owned()))
        );
        assert!(err.downcast_mut::<PlotHostError>().is_some());
    }

    #[test]
    fn test_utf16_errors() {
        let err: ErrorWrapper = String::from_utf16(&[0xd800]).unwrap_err().into();
        assert!(err.is::<std::string::FromUtf16Error>());
        assert!(err.downcast_ref::<PlotHostError>().is_none());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(PlotHostError::InvalidHostWindow(0).to_string(), "invalid host window was given: 0x0");
        assert_eq!(PlotHostError::WindowQuery("class_name".to_owned()).to_string(), "window query class_name failed");
    }
}
