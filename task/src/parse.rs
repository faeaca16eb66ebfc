//! Line-delimited task reader.
//!
//! Reads the translator output format: version and metric headers,
//! variables with axiom layers and domains, mutex groups, the initial
//! state, the goal conjunction, operators (prevail conditions plus
//! effects given as condition list / variable / pre-value / post-value),
//! and axiom rules. The input is consumed once, front to back.
//!
//! Every fact read from the input is range-checked against the variable
//! domains; violations surface as typed [`ParseError`]s, never panics.

use std::io::BufRead;

use thiserror::Error;

use crate::fact::FactPair;
use crate::task::{AxiomRule, Effect, Operator, PlanningTask, Variable};

/// Supported input format version.
const SUPPORTED_VERSION: i64 = 3;

/// Typed failure while reading a task.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line}: unexpected end of input (expected {expected})")]
    UnexpectedEof { line: usize, expected: String },

    #[error("line {line}: expected `{expected}`, found `{found}`")]
    UnexpectedToken {
        line: usize,
        expected: String,
        found: String,
    },

    #[error("line {line}: expected an integer, found `{found}`")]
    ExpectedInt { line: usize, found: String },

    #[error("unsupported task format version {version} (supported: {SUPPORTED_VERSION})")]
    UnsupportedVersion { version: i64 },

    #[error("line {line}: {detail}")]
    Malformed { line: usize, detail: String },

    #[error("i/o error reading task: {0}")]
    Io(#[from] std::io::Error),
}

/// Read a complete task from `input`.
///
/// # Errors
///
/// Returns [`ParseError`] on i/o failure, malformed sections, version
/// mismatch, or facts outside their variable's domain.
pub fn read_task<R: BufRead>(input: R) -> Result<PlanningTask, ParseError> {
    Reader::new(input).read_task()
}

struct Reader<R> {
    input: R,
    line: usize,
    buf: String,
}

impl<R: BufRead> Reader<R> {
    fn new(input: R) -> Self {
        Self {
            input,
            line: 0,
            buf: String::new(),
        }
    }

    fn next_line(&mut self, expected: &str) -> Result<&str, ParseError> {
        self.buf.clear();
        let read = self.input.read_line(&mut self.buf)?;
        if read == 0 {
            return Err(ParseError::UnexpectedEof {
                line: self.line,
                expected: expected.to_string(),
            });
        }
        self.line += 1;
        Ok(self.buf.trim_end_matches(|c| c == '\n' || c == '\r'))
    }

    fn expect(&mut self, keyword: &str) -> Result<(), ParseError> {
        let line = self.line + 1;
        let found = self.next_line(keyword)?;
        if found == keyword {
            Ok(())
        } else {
            Err(ParseError::UnexpectedToken {
                line,
                expected: keyword.to_string(),
                found: found.to_string(),
            })
        }
    }

    fn read_int(&mut self, what: &str) -> Result<i64, ParseError> {
        let line = self.line + 1;
        let text = self.next_line(what)?;
        text.trim()
            .parse()
            .map_err(|_| ParseError::ExpectedInt {
                line,
                found: text.to_string(),
            })
    }

    fn read_count(&mut self, what: &str) -> Result<usize, ParseError> {
        let value = self.read_int(what)?;
        usize::try_from(value).map_err(|_| ParseError::Malformed {
            line: self.line,
            detail: format!("negative {what}: {value}"),
        })
    }

    /// Read space-separated integers from a single line.
    fn read_ints(&mut self, count: usize, what: &str) -> Result<Vec<i64>, ParseError> {
        let line = self.line + 1;
        let text = self.next_line(what)?.to_string();
        let mut values = Vec::with_capacity(count);
        for token in text.split_whitespace() {
            values.push(token.parse().map_err(|_| ParseError::ExpectedInt {
                line,
                found: token.to_string(),
            })?);
        }
        if values.len() != count {
            return Err(ParseError::Malformed {
                line,
                detail: format!("expected {count} integers for {what}, found {}", values.len()),
            });
        }
        Ok(values)
    }

    fn read_task(&mut self) -> Result<PlanningTask, ParseError> {
        self.expect("begin_version")?;
        let version = self.read_int("version")?;
        if version != SUPPORTED_VERSION {
            return Err(ParseError::UnsupportedVersion { version });
        }
        self.expect("end_version")?;

        self.expect("begin_metric")?;
        let use_metric = self.read_int("metric flag")? == 1;
        self.expect("end_metric")?;

        let variables = self.read_variables()?;
        let mutex_groups = self.read_mutex_groups(&variables)?;
        let initial_values = self.read_initial_state(&variables)?;
        let goal = self.read_goal(&variables)?;
        let operators = self.read_operators(&variables, use_metric)?;
        let axioms = self.read_axioms(&variables)?;

        Ok(PlanningTask {
            variables,
            mutex_groups,
            initial_values,
            goal,
            operators,
            axioms,
            use_metric,
        })
    }

    fn read_variables(&mut self) -> Result<Vec<Variable>, ParseError> {
        let count = self.read_count("variable count")?;
        let mut variables = Vec::with_capacity(count);
        for _ in 0..count {
            self.expect("begin_variable")?;
            let name = self.next_line("variable name")?.to_string();
            let axiom_layer = i32::try_from(self.read_int("axiom layer")?).map_err(|_| {
                ParseError::Malformed {
                    line: self.line,
                    detail: "axiom layer out of range".into(),
                }
            })?;
            let domain_size = self.read_int("domain size")?;
            if domain_size < 1 || domain_size > i64::from(i32::MAX) {
                return Err(ParseError::Malformed {
                    line: self.line,
                    detail: format!("invalid domain size {domain_size} for variable {name}"),
                });
            }
            // Value names are part of the format but not of the model.
            for _ in 0..domain_size {
                self.next_line("value name")?;
            }
            self.expect("end_variable")?;
            variables.push(Variable {
                name,
                domain_size: domain_size as i32,
                axiom_layer,
            });
        }
        Ok(variables)
    }

    fn read_fact(&mut self, variables: &[Variable], what: &str) -> Result<FactPair, ParseError> {
        let pair = self.read_ints(2, what)?;
        self.check_fact(variables, pair[0], pair[1])
    }

    fn check_fact(
        &self,
        variables: &[Variable],
        var: i64,
        value: i64,
    ) -> Result<FactPair, ParseError> {
        let var_index = usize::try_from(var)
            .ok()
            .filter(|&v| v < variables.len())
            .ok_or_else(|| ParseError::Malformed {
                line: self.line,
                detail: format!("variable index {var} out of range"),
            })?;
        let domain = i64::from(variables[var_index].domain_size);
        if value < 0 || value >= domain {
            return Err(ParseError::Malformed {
                line: self.line,
                detail: format!("value {value} outside domain of variable {var}"),
            });
        }
        Ok(FactPair::new(var_index, value as i32))
    }

    fn read_mutex_groups(
        &mut self,
        variables: &[Variable],
    ) -> Result<Vec<Vec<FactPair>>, ParseError> {
        let count = self.read_count("mutex group count")?;
        let mut groups = Vec::with_capacity(count);
        for _ in 0..count {
            self.expect("begin_mutex_group")?;
            let size = self.read_count("mutex group size")?;
            let mut group = Vec::with_capacity(size);
            for _ in 0..size {
                group.push(self.read_fact(variables, "mutex fact")?);
            }
            self.expect("end_mutex_group")?;
            groups.push(group);
        }
        Ok(groups)
    }

    fn read_initial_state(&mut self, variables: &[Variable]) -> Result<Vec<i32>, ParseError> {
        self.expect("begin_state")?;
        let mut values = Vec::with_capacity(variables.len());
        for var in 0..variables.len() {
            let value = self.read_int("initial value")?;
            let fact = self.check_fact(variables, var as i64, value)?;
            values.push(fact.value);
        }
        self.expect("end_state")?;
        Ok(values)
    }

    fn read_goal(&mut self, variables: &[Variable]) -> Result<Vec<FactPair>, ParseError> {
        self.expect("begin_goal")?;
        let count = self.read_count("goal size")?;
        let mut goal = Vec::with_capacity(count);
        for _ in 0..count {
            goal.push(self.read_fact(variables, "goal fact")?);
        }
        self.expect("end_goal")?;
        Ok(goal)
    }

    fn read_operators(
        &mut self,
        variables: &[Variable],
        use_metric: bool,
    ) -> Result<Vec<Operator>, ParseError> {
        let count = self.read_count("operator count")?;
        let mut operators = Vec::with_capacity(count);
        for _ in 0..count {
            self.expect("begin_operator")?;
            let name = self.next_line("operator name")?.to_string();

            let prevail_count = self.read_count("prevail count")?;
            let mut preconditions = Vec::with_capacity(prevail_count);
            for _ in 0..prevail_count {
                preconditions.push(self.read_fact(variables, "prevail condition")?);
            }

            let effect_count = self.read_count("effect count")?;
            let mut effects = Vec::with_capacity(effect_count);
            for _ in 0..effect_count {
                let line = self.line + 1;
                let text = self.next_line("effect")?.to_string();
                let tokens: Vec<i64> = text
                    .split_whitespace()
                    .map(|t| {
                        t.parse().map_err(|_| ParseError::ExpectedInt {
                            line,
                            found: t.to_string(),
                        })
                    })
                    .collect::<Result<_, _>>()?;
                let effect = self.decode_effect(variables, &tokens, line)?;
                if let Some(pre) = effect.1 {
                    preconditions.push(pre);
                }
                effects.push(effect.0);
            }

            let cost = self.read_int("operator cost")?;
            if cost < 0 || cost > i64::from(i32::MAX) {
                return Err(ParseError::Malformed {
                    line: self.line,
                    detail: format!("cost {cost} for operator {name} out of range"),
                });
            }
            self.expect("end_operator")?;

            preconditions.sort();
            operators.push(Operator {
                name,
                preconditions,
                effects,
                cost: if use_metric { cost as i32 } else { 1 },
            });
        }
        Ok(operators)
    }

    /// Decode `n cond... var pre post` into an effect plus the optional
    /// precondition the pre-value encodes (`-1` means unconditional).
    fn decode_effect(
        &self,
        variables: &[Variable],
        tokens: &[i64],
        line: usize,
    ) -> Result<(Effect, Option<FactPair>), ParseError> {
        let malformed = |detail: String| ParseError::Malformed { line, detail };
        let &condition_count = tokens.first().ok_or_else(|| malformed("empty effect".into()))?;
        let condition_count = usize::try_from(condition_count)
            .map_err(|_| malformed("negative effect condition count".into()))?;
        if tokens.len() != 1 + 2 * condition_count + 3 {
            return Err(malformed(format!(
                "effect with {condition_count} conditions needs {} tokens, found {}",
                1 + 2 * condition_count + 3,
                tokens.len()
            )));
        }
        let mut conditions = Vec::with_capacity(condition_count);
        for i in 0..condition_count {
            conditions.push(self.check_fact(variables, tokens[1 + 2 * i], tokens[2 + 2 * i])?);
        }
        let var = tokens[1 + 2 * condition_count];
        let pre = tokens[2 + 2 * condition_count];
        let post = tokens[3 + 2 * condition_count];
        let fact = self.check_fact(variables, var, post)?;
        let precondition = if pre == -1 {
            None
        } else {
            Some(self.check_fact(variables, var, pre)?)
        };
        conditions.sort();
        Ok((Effect { conditions, fact }, precondition))
    }

    fn read_axioms(&mut self, variables: &[Variable]) -> Result<Vec<AxiomRule>, ParseError> {
        let count = self.read_count("axiom count")?;
        let mut axioms = Vec::with_capacity(count);
        for _ in 0..count {
            self.expect("begin_rule")?;
            let condition_count = self.read_count("axiom condition count")?;
            let mut conditions = Vec::with_capacity(condition_count + 1);
            for _ in 0..condition_count {
                conditions.push(self.read_fact(variables, "axiom condition")?);
            }
            let head = self.read_ints(3, "axiom head")?;
            let fact = self.check_fact(variables, head[0], head[2])?;
            if !variables[fact.var].is_derived() {
                return Err(ParseError::Malformed {
                    line: self.line,
                    detail: format!("axiom head variable {} is not derived", fact.var),
                });
            }
            if head[1] != -1 {
                conditions.push(self.check_fact(variables, head[0], head[1])?);
            }
            self.expect("end_rule")?;
            conditions.sort();
            axioms.push(AxiomRule { conditions, head: fact });
        }
        Ok(axioms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One binary variable, one `flip` operator with cost 3, goal v=1.
    const FLIP_TASK: &str = "\
begin_version
3
end_version
begin_metric
1
end_metric
1
begin_variable
var0
-1
2
Atom off()
Atom on()
end_variable
0
begin_state
0
end_state
begin_goal
1
0 1
end_goal
1
begin_operator
flip
0
1
0 0 0 1
3
end_operator
0
";

    #[test]
    fn reads_the_flip_task() {
        let task = read_task(FLIP_TASK.as_bytes()).expect("parse");
        assert_eq!(task.variables.len(), 1);
        assert_eq!(task.initial_values, vec![0]);
        assert_eq!(task.goal, vec![FactPair::new(0, 1)]);
        assert_eq!(task.operators.len(), 1);
        let op = &task.operators[0];
        assert_eq!(op.name, "flip");
        assert_eq!(op.cost, 3);
        assert_eq!(op.preconditions, vec![FactPair::new(0, 0)]);
        assert_eq!(op.effects.len(), 1);
        assert_eq!(op.effects[0].fact, FactPair::new(0, 1));
        assert!(task.use_metric);
    }

    #[test]
    fn metric_off_forces_unit_costs() {
        let text = FLIP_TASK.replacen("begin_metric\n1", "begin_metric\n0", 1);
        let task = read_task(text.as_bytes()).expect("parse");
        assert_eq!(task.operators[0].cost, 1);
    }

    #[test]
    fn rejects_wrong_version() {
        let text = FLIP_TASK.replacen("begin_version\n3", "begin_version\n2", 1);
        let err = read_task(text.as_bytes()).unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedVersion { version: 2 }));
    }

    #[test]
    fn rejects_out_of_domain_goal_fact() {
        let text = FLIP_TASK.replacen("begin_goal\n1\n0 1", "begin_goal\n1\n0 7", 1);
        let err = read_task(text.as_bytes()).unwrap_err();
        assert!(matches!(err, ParseError::Malformed { .. }), "got {err:?}");
    }

    #[test]
    fn rejects_truncated_input() {
        let text = &FLIP_TASK[..FLIP_TASK.find("begin_goal").unwrap()];
        let err = read_task(text.as_bytes()).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { .. }), "got {err:?}");
    }

    #[test]
    fn effect_pre_value_becomes_a_precondition() {
        let task = read_task(FLIP_TASK.as_bytes()).expect("parse");
        // `0 0 0 1` encodes: no conditions, var 0, pre 0, post 1.
        assert_eq!(task.operators[0].preconditions, vec![FactPair::new(0, 0)]);
    }

    #[test]
    fn reads_axiom_rules() {
        let text = "\
begin_version
3
end_version
begin_metric
0
end_metric
2
begin_variable
var0
-1
2
Atom a()
NegatedAtom a()
end_variable
begin_variable
var1
0
2
Atom d()
NegatedAtom d()
end_variable
0
begin_state
0
1
end_state
begin_goal
1
1 0
end_goal
0
1
begin_rule
1
0 0
1 1 0
end_rule
";
        let task = read_task(text.as_bytes()).expect("parse");
        assert_eq!(task.axioms.len(), 1);
        let rule = &task.axioms[0];
        assert_eq!(rule.head, FactPair::new(1, 0));
        // Body condition plus the head pre-value condition.
        assert_eq!(
            rule.conditions,
            vec![FactPair::new(0, 0), FactPair::new(1, 1)]
        );
    }
}
