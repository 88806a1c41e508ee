//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code in the widget core, the API server and the
//! TUI MUST NOT call sleep methods. Waiting happens on I/O, channels or
//! deadlines (`sleep_until`, `interval`).
//! **Exceptions**: Frame rate limiting (TUI only), exponential backoff
//! (retry logic only), test code (`#[cfg(test)]` modules and test functions)

use std::fs;
use std::path::Path;

use architectural_enforcement::{code_part, rust_sources};

/// Test that production code does not contain sleep() calls
#[test]
fn test_no_sleep_in_production_code() {
    let violations = find_sleep_violations();

    if !violations.is_empty() {
        eprintln!("\n❌ CRITICAL: Sleep calls found in production code!\n");

        for violation in &violations {
            eprintln!("  ❌ {}", violation);
        }

        eprintln!("\n✅ ACCEPTABLE sleep uses:");
        eprintln!("  - Frame rate limiting in TUI (tokio::time::sleep in frame control)");
        eprintln!("  - Exponential backoff in retry logic");
        eprintln!("  - Test code (#[cfg(test)] modules, #[test] or #[tokio::test] functions)");
        eprintln!("  - Deadline timers (tokio::time::sleep_until) and interval()");
        eprintln!("\n❌ FORBIDDEN:");
        eprintln!("  - Sleep in polling loops");
        eprintln!("  - Sleep as poor man's synchronization");
        eprintln!("  - Sleep to 'wait' for a model load or a stream (use channels!)");

        panic!(
            "\nFound {} sleep violation(s) in production code.\nFix these before merging!",
            violations.len()
        );
    }
}

/// Find all sleep() calls in production code
fn find_sleep_violations() -> Vec<String> {
    let mut violations = Vec::new();

    check_directory(
        "tui/src",
        &mut violations,
        &SleepPolicy {
            allow_frame_limiting: true,
            allow_backoff: false,
        },
    );

    check_directory(
        "widget/core/src",
        &mut violations,
        &SleepPolicy {
            allow_frame_limiting: false,
            allow_backoff: true,
        },
    );

    check_directory(
        "widget/api/src",
        &mut violations,
        &SleepPolicy {
            allow_frame_limiting: false,
            allow_backoff: true,
        },
    );

    violations
}

struct SleepPolicy {
    allow_frame_limiting: bool,
    allow_backoff: bool,
}

fn check_directory(dir: &str, violations: &mut Vec<String>, policy: &SleepPolicy) {
    for path in rust_sources(dir) {
        check_file(&path, violations, policy);
    }
}

fn check_file(path: &Path, violations: &mut Vec<String>, policy: &SleepPolicy) {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return,
    };

    let lines: Vec<&str> = content.lines().collect();
    let production = production_lines(&lines);

    for (idx, line) in lines.iter().enumerate().take(production) {
        if !is_sleep_call(line) {
            continue;
        }

        if is_in_test_function(&lines, idx) {
            continue;
        }

        // Frame limiting is only allowed in the TUI event loop
        if policy.allow_frame_limiting
            && path.ends_with("tui/src/app.rs")
            && is_frame_limiting_context(&lines, idx)
        {
            continue;
        }

        if policy.allow_backoff && is_backoff_context(&lines, idx) {
            continue;
        }

        if is_interval_pattern(&lines, idx) {
            continue;
        }

        violations.push(format!("{}:{} - {}", path.display(), idx + 1, line.trim()));
    }
}

/// `sleep(` calls; `sleep_until(` waits on a deadline and is fine
fn is_sleep_call(line: &str) -> bool {
    let code = code_part(line);
    code.contains("::sleep(") || code.contains(".sleep(")
}

/// Number of leading lines before the file's `#[cfg(test)]` module
fn production_lines(lines: &[&str]) -> usize {
    lines
        .windows(2)
        .position(|pair| {
            pair[0].trim() == "#[cfg(test)]" && pair[1].trim_start().starts_with("mod ")
        })
        .unwrap_or(lines.len())
}

/// Check if line is inside a test function
fn is_in_test_function(lines: &[&str], current_idx: usize) -> bool {
    for i in (0..current_idx).rev() {
        let line = lines[i].trim();

        if line.starts_with("#[test]") || line.starts_with("#[tokio::test") {
            return true;
        }

        if (line.starts_with("fn ") || line.starts_with("async fn ")) && !line.contains("test") {
            return false;
        }

        // Stop at module boundaries
        if line.starts_with("mod ") || line.starts_with("impl ") {
            return false;
        }
    }
    false
}

/// Check if sleep is used for frame rate limiting (acceptable in TUI)
fn is_frame_limiting_context(lines: &[&str], current_idx: usize) -> bool {
    let context_range = current_idx.saturating_sub(10)..std::cmp::min(current_idx + 5, lines.len());

    lines[context_range].iter().any(|line| {
        let line = line.to_lowercase();
        line.contains("frame") || line.contains("fps") || line.contains("tick_rate")
    })
}

/// Check if sleep is used for exponential backoff (acceptable for retry logic)
fn is_backoff_context(lines: &[&str], current_idx: usize) -> bool {
    let context_range = current_idx.saturating_sub(15)..std::cmp::min(current_idx + 5, lines.len());

    let mut has_backoff_calc = false;
    let mut has_retry_context = false;

    for line in &lines[context_range] {
        let line = line.to_lowercase();

        if line.contains("<<") || line.contains("pow") || line.contains("* 2") {
            has_backoff_calc = true;
        }

        if line.contains("retry")
            || line.contains("reconnect")
            || line.contains("backoff")
            || line.contains("attempt")
        {
            has_retry_context = true;
        }
    }

    has_backoff_calc && has_retry_context
}

/// Check if this is tokio::time::interval pattern (acceptable for periodic tasks)
fn is_interval_pattern(lines: &[&str], current_idx: usize) -> bool {
    let before = current_idx.saturating_sub(20)..current_idx;
    if lines[before]
        .iter()
        .any(|line| line.contains("interval.tick()") || line.contains("tokio::time::interval"))
    {
        return true;
    }

    let after = current_idx..std::cmp::min(current_idx + 5, lines.len());
    lines[after].iter().any(|line| line.contains("interval.tick()"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sleep_call_detection() {
        assert!(is_sleep_call("    tokio::time::sleep(Duration::from_millis(10)).await;"));
        assert!(is_sleep_call("    std::thread::sleep(d);"));
        assert!(!is_sleep_call("    tokio::time::sleep_until(next).await;"));
        assert!(!is_sleep_call("    // tokio::time::sleep(d).await;"));
    }

    #[test]
    fn test_non_test_function_detected() {
        let code = vec![
            "fn bad_function() {",
            "    tokio::time::sleep(Duration::from_millis(10)).await;",
            "}",
        ];

        assert!(!is_in_test_function(&code, 1));
    }

    #[test]
    fn test_cfg_test_module_is_excluded() {
        let code = vec![
            "fn run() {}",
            "",
            "#[cfg(test)]",
            "mod tests {",
            "    impl Fake {",
            "        async fn load(&self) { tokio::time::sleep(d).await; }",
            "    }",
            "}",
        ];

        assert_eq!(production_lines(&code), 2);
    }

    #[test]
    fn test_backoff_detection() {
        let code = vec![
            "fn reconnect() {",
            "    let delay = base_delay * (1 << attempt);",
            "    tracing::warn!(attempt, \"Retry\");",
            "    tokio::time::sleep(Duration::from_millis(delay)).await;",
            "}",
        ];

        assert!(is_backoff_context(&code, 3));
    }

    #[test]
    fn test_frame_limiting_detection() {
        let code = vec![
            "fn render_loop() {",
            "    let frame_duration = Duration::from_millis(33);",
            "    loop {",
            "        render();",
            "        tokio::time::sleep(frame_duration).await;",
            "    }",
            "}",
        ];

        assert!(is_frame_limiting_context(&code, 4));
    }
}
