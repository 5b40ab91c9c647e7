//! Parser for debugger `bt` text output.
//!
//! ```text
//! #0  pt_bind_names (parser=0x6020, node=0x7010) at /src/parser/name_resolution.c:2214
//! #1  0x00007f3c in pt_compile (parser=0x6020) at /src/parser/compile.c:377
//! #2  0x00007f3d in __libc_start_main () from /lib64/libc.so.6
//! ```

use crate::host::StackFrame;
use regex::Regex;
use std::sync::OnceLock;

fn frame_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^#\d+\s+(?:0x[0-9a-fA-F]+\s+in\s+)?(?P<func>[^\s(]+)(?P<rest>.*)$")
            .expect("frame regex is valid")
    })
}

fn location_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\sat\s+(?P<file>\S+):(?P<line>\d+)\s*$").expect("location regex is valid")
    })
}

/// Parse one frame line; continuation and unrelated lines yield `None`.
pub fn parse_frame(line: &str) -> Option<StackFrame> {
    let caps = frame_re().captures(line.trim())?;
    let function = caps.name("func")?.as_str();
    let rest = caps.name("rest").map_or("", |m| m.as_str());

    let (file, line_no) = match location_re().captures(rest) {
        Some(loc) => (
            loc.name("file").map(|m| m.as_str()),
            loc.name("line").and_then(|m| m.as_str().parse().ok()),
        ),
        None => (None, None),
    };
    Some(StackFrame::new(function, file, line_no))
}

/// Frames in the order printed: innermost first.
pub fn parse_backtrace(text: &str) -> Vec<StackFrame> {
    text.lines().filter_map(parse_frame).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BT: &str = "\
#0  pt_bind_names (parser=0x6020, node=0x7010) at /src/parser/name_resolution.c:2214
#1  0x00007f3c in pt_compile (parser=0x6020) at /src/parser/compile.c:377
    continuation of a long argument list
#2  0x00007f3d in __libc_start_main () from /lib64/libc.so.6
";

    #[test]
    fn parses_gdb_frames() {
        let frames = parse_backtrace(BT);
        assert_eq!(frames.len(), 3);

        assert_eq!(frames[0].function, "pt_bind_names");
        assert_eq!(
            frames[0].file.as_deref(),
            Some("/src/parser/name_resolution.c")
        );
        assert_eq!(frames[0].line, Some(2214));

        assert_eq!(frames[1].function, "pt_compile");
        assert_eq!(frames[1].line, Some(377));
        assert_eq!(frames[1].cluster_name(), "parser/compile.c");
    }

    #[test]
    fn frames_without_source_have_no_location() {
        let frames = parse_backtrace(BT);
        assert_eq!(frames[2].function, "__libc_start_main");
        assert_eq!(frames[2].file, None);
        assert_eq!(frames[2].line, None);
    }

    #[test]
    fn ignores_unrelated_lines() {
        assert!(parse_frame("Breakpoint 1, main () at main.c:3").is_none());
        assert!(parse_frame("").is_none());
    }
}
