//! JSON run report printed by `--json`.

use crate::error::{ProcshError, Result};
use crate::pipeline::RunningPipeline;
use crate::running::{RunState, RunningCommand};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub(super) struct RunReport {
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    pub exit_code: Option<i32>,
    pub ok: bool,
    pub timed_out: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub wall_time_ms: Option<u64>,
    pub stdout: String,
    pub stderr: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stages: Vec<StageReport>,
}

#[derive(Debug, Serialize)]
pub(super) struct StageReport {
    pub command: String,
    pub pid: Option<u32>,
    pub exit_code: Option<i32>,
}

impl RunReport {
    pub fn from_command(cmd: &RunningCommand) -> Self {
        Self {
            command: cmd.command_line(),
            pid: cmd.pid(),
            exit_code: cmd.exit_code(),
            ok: cmd.ok(),
            timed_out: cmd.state() == RunState::TimedOut,
            started_at: cmd.started_at(),
            finished_at: cmd.finished_at(),
            wall_time_ms: cmd.wall_time().map(|d| d.as_millis() as u64),
            stdout: cmd.stdout_lossy().into_owned(),
            stderr: cmd.stderr_lossy().into_owned(),
            stages: Vec::new(),
        }
    }

    pub fn from_pipeline(pipeline: &RunningPipeline) -> Self {
        Self {
            command: pipeline.to_string(),
            pid: None,
            exit_code: pipeline.exit_code(),
            ok: pipeline.ok(),
            timed_out: pipeline.state() == RunState::TimedOut,
            started_at: pipeline.started_at(),
            finished_at: pipeline.finished_at(),
            wall_time_ms: pipeline.wall_time().map(|d| d.as_millis() as u64),
            stdout: pipeline.stdout_lossy().into_owned(),
            stderr: pipeline.stderr_lossy().into_owned(),
            stages: pipeline
                .stages()
                .iter()
                .map(|stage| StageReport {
                    command: stage.command_line(),
                    pid: stage.pid(),
                    exit_code: stage.exit_code(),
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ProcshError::Io(format!("failed to serialize report: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ExecOptions;
    use crate::shell::Shell;

    #[test]
    fn test_command_report() {
        let cmd = Shell::new()
            .command("echo")
            .unwrap()
            .call(["hi"], &ExecOptions::new())
            .unwrap();
        let report = RunReport::from_command(&cmd);

        assert_eq!(report.exit_code, Some(0));
        assert!(report.ok);
        assert!(!report.timed_out);
        assert_eq!(report.stdout, "hi\n");

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["exit_code"], 0);
        assert_eq!(json["stdout"], "hi\n");
        assert!(json["started_at"].is_string());
        assert!(json.get("stages").is_none());
    }

    #[test]
    fn test_pipeline_report_lists_stages() {
        let sh = Shell::new();
        let false_cmd = sh.command("false").unwrap();
        let cat = sh.command("cat").unwrap();
        let pipeline = sh
            .run_pipeline(ExecOptions::new(), |p| {
                p.register(false_cmd.prepare(Vec::<&str>::new(), &ExecOptions::new())?)?;
                p.register(cat.prepare(Vec::<&str>::new(), &ExecOptions::new())?)
            })
            .unwrap();
        let report = RunReport::from_pipeline(&pipeline);

        assert_eq!(report.exit_code, Some(0));
        assert_eq!(report.stages.len(), 2);
        assert_eq!(report.stages[0].exit_code, Some(1));

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert!(json.get("pid").is_none());
        assert_eq!(json["stages"][1]["exit_code"], 0);
    }
}
