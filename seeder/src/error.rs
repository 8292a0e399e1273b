/// A client invocation that could not be launched or did not exit successfully.
#[derive(Debug, thiserror::Error)]
pub enum ProcessFailure {
    #[error("Failed to launch `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` exited with {}", describe_exit(.code, .signal))]
    Exited {
        command: String,
        /// `None` when the client was terminated by a signal.
        code: Option<i32>,
        signal: Option<i32>,
    },
}

impl ProcessFailure {
    /// The exit code the seeder should terminate with so that callers see the client's failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            ProcessFailure::Spawn { .. } => 1,
            ProcessFailure::Exited {
                code: Some(code), ..
            } => u8::try_from(*code).ok().filter(|c| *c != 0).unwrap_or(1),
            ProcessFailure::Exited {
                code: None,
                signal: Some(signal),
                ..
            } => u8::try_from(128 + *signal).unwrap_or(1),
            ProcessFailure::Exited { .. } => 1,
        }
    }

    /// The rendered command line of the failed invocation.
    pub fn command(&self) -> &str {
        match self {
            ProcessFailure::Spawn { command, .. } | ProcessFailure::Exited { command, .. } => {
                command
            }
        }
    }
}

fn describe_exit(code: &Option<i32>, signal: &Option<i32>) -> String {
    match (code, signal) {
        (Some(code), _) => format!("exit code {code}"),
        (None, Some(signal)) => format!("signal {signal}"),
        (None, None) => "an unknown status".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_propagates_client_code() {
        let failure = ProcessFailure::Exited {
            command: "CodeChecker store".to_string(),
            code: Some(3),
            signal: None,
        };
        assert_eq!(3, failure.exit_code());
        assert_eq!("`CodeChecker store` exited with exit code 3", failure.to_string());
    }

    #[test]
    fn exit_code_for_signal_is_offset() {
        let failure = ProcessFailure::Exited {
            command: "CodeChecker store".to_string(),
            code: None,
            signal: Some(9),
        };
        assert_eq!(137, failure.exit_code());
    }

    #[test]
    fn exit_code_out_of_range_falls_back_to_one() {
        let failure = ProcessFailure::Exited {
            command: "CodeChecker store".to_string(),
            code: Some(256),
            signal: None,
        };
        assert_eq!(1, failure.exit_code());

        let failure = ProcessFailure::Spawn {
            command: "CodeChecker cmd login root".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(1, failure.exit_code());
    }
}
