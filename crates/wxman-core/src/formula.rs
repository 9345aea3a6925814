//! Homebrew formula generation.
//!
//! Renders the Ruby formula a tap publishes for one release channel. The
//! formula encodes the same table the resolver reads: an `on_arm`/`on_intel`
//! block per platform with its URL and digest, and `odie` for platforms the
//! release declares unsupported.

use std::fmt::Write;

use wxman_schema::{
    Arch, BINARY_NAME, Os, PlatformEntry, PlatformKey, ReleaseChannel, VERSION_FLAG,
};

/// Descriptive fields of the formula that are not part of the release table.
#[derive(Debug, Clone)]
pub struct FormulaMeta {
    /// Formula class name (e.g., "Wxman")
    pub class_name: String,
    pub desc: String,
    pub homepage: String,
    pub license: String,
}

impl Default for FormulaMeta {
    fn default() -> Self {
        Self {
            class_name: "Wxman".to_string(),
            desc: "Terminal weather dashboard".to_string(),
            homepage: "https://github.com/wxman/wxman".to_string(),
            license: "MIT".to_string(),
        }
    }
}

/// Render the formula for `channel`.
pub fn render_formula(channel: &ReleaseChannel, meta: &FormulaMeta) -> String {
    let mut formula = String::new();
    let _ = write!(
        formula,
        r#"class {} < Formula
  desc "{}"
  homepage "{}"
  version "{}"
  license "{}"
"#,
        meta.class_name, meta.desc, meta.homepage, channel.version, meta.license
    );

    for os in [Os::Macos, Os::Linux] {
        let blocks: Vec<String> = [Arch::Aarch64, Arch::X86_64]
            .into_iter()
            .filter_map(|arch| arch_block(channel, PlatformKey::new(os, arch)))
            .collect();
        if blocks.is_empty() {
            continue;
        }
        let _ = writeln!(formula, "\n  on_{} do", os.as_str());
        for block in blocks {
            formula.push_str(&block);
        }
        formula.push_str("  end\n");
    }

    formula.push_str("\n  def install\n");
    let _ = writeln!(formula, "    bin.install \"{BINARY_NAME}\"");
    formula.push_str("  end\n\n");
    formula.push_str("  test do\n");
    // Ruby string interpolation: #{bin} - we need literal #{ in the output
    let _ = writeln!(
        formula,
        "    assert_match version.to_s, shell_output(\"#{{bin}}/{BINARY_NAME} {VERSION_FLAG}\")"
    );
    formula.push_str("  end\nend\n");

    formula
}

fn arch_block(channel: &ReleaseChannel, key: PlatformKey) -> Option<String> {
    let selector = match key.arch {
        Arch::Aarch64 => "on_arm",
        Arch::X86_64 => "on_intel",
    };
    match channel.get(key)? {
        PlatformEntry::Artifact(artifact) => Some(format!(
            "    {selector} do\n      url \"{}\"\n      sha256 \"{}\"\n    end\n",
            artifact.url, artifact.sha256
        )),
        PlatformEntry::Unsupported { reason } => Some(format!(
            "    {selector} do\n      odie \"{}\"\n    end\n",
            ruby_string(reason)
        )),
    }
}

/// Escape text for a double-quoted Ruby literal. `#` is escaped so `#{`,
/// `#@` and `#$` cannot interpolate.
fn ruby_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '"' | '#' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}
