//! Custom data encoding. The transform is one-way: the encoded form cannot be turned back
//! into the text the user wrote.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::constants::{DEFAULT_INTERPRETER, REBOOT_COMMAND};

/// Normalize line endings, ensure an interpreter line, append the reboot command if asked.
pub fn normalize(payload: &str, reboot: bool) -> String {
    let mut script = payload.replace("\r\n", "\n").replace('\r', "\n");

    let has_interpreter = script
        .lines()
        .find(|line| !line.trim().is_empty())
        .is_some_and(|line| line.trim().starts_with("#!"));
    if !has_interpreter {
        script = format!("{}\n{}", DEFAULT_INTERPRETER, script);
    }

    if reboot {
        if !script.ends_with('\n') {
            script.push('\n');
        }
        script.push('\n');
        script.push_str(REBOOT_COMMAND);
        script.push('\n');
    }
    script
}

/// Normalize and base64-encode a payload for `osProfile.customData`.
pub fn encode(payload: &str, reboot: bool) -> String {
    STANDARD.encode(normalize(payload, reboot))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crlf_is_normalized_and_interpreter_added() {
        assert_eq!(normalize("echo a\r\necho b\r", false), "#!/bin/bash\necho a\necho b\n");
    }

    #[test]
    fn existing_interpreter_after_blank_lines_is_kept() {
        assert_eq!(normalize("\n  #!/bin/sh\necho a\n", false), "\n  #!/bin/sh\necho a\n");
    }

    #[test]
    fn reboot_goes_on_its_own_blank_separated_line() {
        assert_eq!(
            normalize("#!/bin/bash\necho a", true),
            "#!/bin/bash\necho a\n\nshutdown -r +1\n"
        );
    }

    #[test]
    fn empty_payload_still_gets_interpreter() {
        assert_eq!(normalize("", false), "#!/bin/bash\n");
    }

    #[test]
    fn encodes_with_standard_base64() {
        assert_eq!(encode("#!/bin/sh", false), "IyEvYmluL3No");
    }
}
