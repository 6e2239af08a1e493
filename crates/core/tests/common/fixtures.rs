//! Test fixtures for creating sample configurations.

use std::path::Path;
use tempfile::TempDir;

/// Create a temporary project with an `.agent-kit/` directory holding a todo
/// agent, a heartbeat agent and a mock agent.
///
/// Returns a TempDir that must be kept alive for the test duration.
#[allow(dead_code)]
pub fn create_test_project() -> std::io::Result<TempDir> {
    let temp_dir = tempfile::tempdir()?;
    let root = temp_dir.path();

    std::fs::create_dir_all(root.join(".agent-kit/agents"))?;
    std::fs::write(
        root.join(".agent-kit/config.toml"),
        "duplicate_registration = \"replace\"\nlog_level = \"debug\"\n",
    )?;

    write_agent(
        root,
        "a-todo.md",
        r#"---
name: todo-1
kind: todo
description: Groceries
---

- [ ] milk
- [x] bread
"#,
    )?;
    write_agent(
        root,
        "b-heartbeat.md",
        "---\nname: pulse\nkind: heartbeat\ninterval_ms: 100\n---\n",
    )?;
    write_agent(root, "c-mock.md", "---\nname: mock\nkind: mock\n---\n")?;

    Ok(temp_dir)
}

/// Write a single agent definition into `.agent-kit/agents/`.
#[allow(dead_code)]
pub fn write_agent(root: &Path, file_name: &str, content: &str) -> std::io::Result<()> {
    let agents_dir = root.join(".agent-kit/agents");
    std::fs::create_dir_all(&agents_dir)?;
    std::fs::write(agents_dir.join(file_name), content)
}
