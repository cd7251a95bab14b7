//! Doctor command - check environment

use crate::ai::ChatClient;
use crate::analyzers::is_python_tool_installed;
use anyhow::Result;

pub fn run() -> Result<()> {
    println!("🩺 DevMate Doctor\n");

    for tool in ["pylint", "bandit", "radon"] {
        if is_python_tool_installed(tool) {
            println!("✓ {}: OK", tool);
        } else {
            println!("○ {}: not found (pip install {})", tool, tool);
        }
    }

    if ChatClient::key_available() {
        println!("✓ Reviewer model: API key configured");
    } else {
        println!("○ Reviewer model: no API key (rule-based hints only)");
        println!("  Set GROQ_API_KEY for model-backed suggestions");
    }

    println!("\nMissing analyzers degrade to empty results; analysis still runs.");
    Ok(())
}
