//! Plan-file output.
//!
//! One `(operator-name)` line per plan step, then a cost comment. Anytime
//! configurations save every improving plan under an incrementing numeric
//! suffix (`sas_plan.1`, `sas_plan.2`, ...); single searches write the
//! plain file name.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use tracing::info;

use foray_task::task::{OperatorId, PlanningTask};

pub struct PlanManager {
    plan_filename: PathBuf,
    num_previously_generated: usize,
}

impl PlanManager {
    #[must_use]
    pub fn new(plan_filename: PathBuf) -> Self {
        Self {
            plan_filename,
            num_previously_generated: 0,
        }
    }

    /// Write `plan` to the next plan file and return its path.
    ///
    /// # Errors
    ///
    /// Propagates file-creation and write failures.
    pub fn save_plan(
        &mut self,
        plan: &[OperatorId],
        task: &PlanningTask,
        generates_multiple_plan_files: bool,
    ) -> io::Result<PathBuf> {
        let index = self.num_previously_generated + 1;
        let path = if generates_multiple_plan_files {
            let mut name = self.plan_filename.clone().into_os_string();
            name.push(format!(".{index}"));
            PathBuf::from(name)
        } else {
            self.plan_filename.clone()
        };

        let mut file = BufWriter::new(File::create(&path)?);
        for &op_id in plan {
            writeln!(file, "({})", task.operator(op_id).name)?;
        }
        let cost = task.plan_cost(plan);
        let cost_kind = if task.is_unit_cost() {
            "unit cost"
        } else {
            "general cost"
        };
        writeln!(file, "; cost = {cost} ({cost_kind})")?;
        file.flush()?;

        self.num_previously_generated = index;
        info!(
            "Plan length: {} step(s). Plan cost: {cost}. Saved to {}",
            plan.len(),
            path.display()
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foray_task::fact::FactPair;
    use foray_task::task::{Effect, Operator, Variable};

    fn flip_task(cost: i32) -> PlanningTask {
        PlanningTask {
            variables: vec![Variable {
                name: "v".into(),
                domain_size: 2,
                axiom_layer: -1,
            }],
            mutex_groups: Vec::new(),
            initial_values: vec![0],
            goal: vec![FactPair::new(0, 1)],
            operators: vec![Operator {
                name: "flip now".into(),
                preconditions: vec![FactPair::new(0, 0)],
                effects: vec![Effect {
                    conditions: Vec::new(),
                    fact: FactPair::new(0, 1),
                }],
                cost,
            }],
            axioms: Vec::new(),
            use_metric: true,
        }
    }

    #[test]
    fn writes_operator_lines_and_cost_comment() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut manager = PlanManager::new(dir.path().join("plan"));
        let task = flip_task(3);

        let path = manager
            .save_plan(&[OperatorId::new(0)], &task, false)
            .expect("save");
        let content = std::fs::read_to_string(&path).expect("read");
        assert_eq!(content, "(flip now)\n; cost = 3 (general cost)\n");
    }

    #[test]
    fn unit_cost_tasks_are_labelled_as_such() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut manager = PlanManager::new(dir.path().join("plan"));
        let task = flip_task(1);

        let path = manager
            .save_plan(&[OperatorId::new(0)], &task, false)
            .expect("save");
        let content = std::fs::read_to_string(&path).expect("read");
        assert!(content.ends_with("; cost = 1 (unit cost)\n"), "got {content:?}");
    }

    #[test]
    fn anytime_plans_get_numeric_suffixes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut manager = PlanManager::new(dir.path().join("plan"));
        let task = flip_task(3);

        let first = manager
            .save_plan(&[OperatorId::new(0)], &task, true)
            .expect("save");
        let second = manager
            .save_plan(&[OperatorId::new(0)], &task, true)
            .expect("save");
        assert!(first.to_string_lossy().ends_with("plan.1"));
        assert!(second.to_string_lossy().ends_with("plan.2"));
        assert!(first.exists() && second.exists());
    }
}
