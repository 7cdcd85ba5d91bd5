//! Outcome and severity enums, sent as upper-case strings.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s))
                    .ok_or_else(|| format!("unknown {} '{}'", stringify!($name), s))
            }
        }
    };
}

wire_enum!(
    /// Final state of a test run.
    RunOutcome {
        Running => "RUNNING",
        Pass => "PASS",
        Fail => "FAIL",
        Error => "ERROR",
        Timeout => "TIMEOUT",
        Aborted => "ABORTED",
    }
);

wire_enum!(PhaseOutcome {
    Pass => "PASS",
    Fail => "FAIL",
    Skip => "SKIP",
    Error => "ERROR",
});

wire_enum!(MeasurementOutcome {
    Pass => "PASS",
    Fail => "FAIL",
    Unset => "UNSET",
});

wire_enum!(
    /// Severity of a run log line.
    LogLevel {
        Debug => "DEBUG",
        Info => "INFO",
        Warning => "WARNING",
        Error => "ERROR",
        Critical => "CRITICAL",
    }
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_string(&RunOutcome::Pass).unwrap(), r#""PASS""#);
        assert_eq!(serde_json::to_string(&LogLevel::Warning).unwrap(), r#""WARNING""#);
        let outcome: PhaseOutcome = serde_json::from_str(r#""SKIP""#).unwrap();
        assert_eq!(outcome, PhaseOutcome::Skip);
        assert!(serde_json::from_str::<MeasurementOutcome>(r#""pass""#).is_err());
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!("aborted".parse::<RunOutcome>().unwrap(), RunOutcome::Aborted);
        assert_eq!("UNSET".parse::<MeasurementOutcome>().unwrap(), MeasurementOutcome::Unset);
        assert!("maybe".parse::<RunOutcome>().is_err());
    }

    #[test]
    fn test_display_matches_wire() {
        for outcome in RunOutcome::ALL {
            let json = serde_json::to_string(outcome).unwrap();
            assert_eq!(json, format!("\"{}\"", outcome));
        }
    }
}
