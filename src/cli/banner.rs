//! 运行前后的纯文本横幅

use std::io::{self, Write};

const RULE_WIDTH: usize = 60;

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// 写出运行开始时的横幅
pub fn write_header<W: Write>(out: &mut W, target: &str) -> io::Result<()> {
    writeln!(out, "{}", rule())?;
    writeln!(out, "Quovarine Deployment Health Monitor")?;
    writeln!(out, "{}", rule())?;
    writeln!(out, "Target: {target}")?;
    writeln!(out, "{}", rule())?;
    writeln!(out)?;
    out.flush()
}

/// 写出运行结束时的横幅
pub fn write_footer<W: Write>(out: &mut W, healthy: bool) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", rule())?;
    if healthy {
        writeln!(out, "✅ Health monitoring completed successfully")?;
    } else {
        writeln!(out, "❌ Health monitoring failed")?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header() {
        let mut out = Vec::new();
        write_header(&mut out, "https://deploy.example.com").unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "=".repeat(60));
        assert_eq!(lines[1], "Quovarine Deployment Health Monitor");
        assert_eq!(lines[3], "Target: https://deploy.example.com");
        assert_eq!(lines[5], "");
    }

    #[test]
    fn test_footer() {
        let mut out = Vec::new();
        write_footer(&mut out, true).unwrap();
        assert!(String::from_utf8(out)
            .unwrap()
            .ends_with("✅ Health monitoring completed successfully\n"));

        let mut out = Vec::new();
        write_footer(&mut out, false).unwrap();
        assert!(String::from_utf8(out)
            .unwrap()
            .ends_with("❌ Health monitoring failed\n"));
    }
}
