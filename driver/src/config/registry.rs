//! The feature registry: every configurable feature with its typed
//! options, defaults, and documentation.
//!
//! `construct` binds a parsed argument list to a task-independent factory;
//! `help_text` renders the documentation printed by `--help`.

use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use foray_search::component::{
    EagerFactory, EvaluatorFactory, IteratedFactory, OpenListFactory, SearchEngineFactory,
};
use foray_search::cost::CostType;
use foray_search::evaluation_result::INFTY;
use foray_search::heuristics::{BlindFactory, GoalCountFactory};
use foray_search::iterated::IteratedSearchOptions;

use super::parser::Value;
use super::ConfigError;

/// Documentation of one option of a feature.
pub struct OptionDoc {
    pub name: &'static str,
    pub type_name: &'static str,
    /// `None` marks a required option.
    pub default: Option<&'static str>,
    pub doc: &'static str,
}

/// Documentation of one registered feature.
pub struct FeatureDoc {
    pub name: &'static str,
    pub synopsis: &'static str,
    pub options: &'static [OptionDoc],
}

/// Every registered feature, in help order.
pub static FEATURES: &[FeatureDoc] = &[
    FeatureDoc {
        name: "g",
        synopsis: "Path cost of the evaluated state.",
        options: &[],
    },
    FeatureDoc {
        name: "const",
        synopsis: "A constant value.",
        options: &[OptionDoc {
            name: "value",
            type_name: "int",
            default: Some("1"),
            doc: "the constant (nonnegative)",
        }],
    },
    FeatureDoc {
        name: "pref",
        synopsis: "0 for states reached via a preferred operator, else 1.",
        options: &[],
    },
    FeatureDoc {
        name: "weight",
        synopsis: "Multiplies an evaluator's value by a weight.",
        options: &[
            OptionDoc {
                name: "eval",
                type_name: "evaluator",
                default: None,
                doc: "the evaluator to scale",
            },
            OptionDoc {
                name: "weight",
                type_name: "int",
                default: None,
                doc: "the weight",
            },
        ],
    },
    FeatureDoc {
        name: "sum",
        synopsis: "Sum of several evaluators; infinite as soon as one is.",
        options: &[OptionDoc {
            name: "evals",
            type_name: "list of evaluators",
            default: None,
            doc: "the summands",
        }],
    },
    FeatureDoc {
        name: "max",
        synopsis: "Largest finite value of several evaluators.",
        options: &[OptionDoc {
            name: "evals",
            type_name: "list of evaluators",
            default: None,
            doc: "the alternatives",
        }],
    },
    FeatureDoc {
        name: "blind",
        synopsis: "0 on goal states, cheapest operator cost elsewhere.",
        options: &[OptionDoc {
            name: "cache_estimates",
            type_name: "bool",
            default: Some("true"),
            doc: "memoize estimates per state",
        }],
    },
    FeatureDoc {
        name: "goalcount",
        synopsis: "Number of unsatisfied goal facts; prefers goal achievers.",
        options: &[OptionDoc {
            name: "cache_estimates",
            type_name: "bool",
            default: Some("true"),
            doc: "memoize estimates per state",
        }],
    },
    FeatureDoc {
        name: "single",
        synopsis: "Best-first open list over one evaluator, FIFO ties.",
        options: &[
            OptionDoc {
                name: "eval",
                type_name: "evaluator",
                default: None,
                doc: "the ordering evaluator",
            },
            OptionDoc {
                name: "pref_only",
                type_name: "bool",
                default: Some("false"),
                doc: "keep only preferred entries",
            },
        ],
    },
    FeatureDoc {
        name: "tiebreaking",
        synopsis: "Lexicographic ordering over several evaluators.",
        options: &[
            OptionDoc {
                name: "evals",
                type_name: "list of evaluators",
                default: None,
                doc: "key evaluators, most significant first",
            },
            OptionDoc {
                name: "pref_only",
                type_name: "bool",
                default: Some("false"),
                doc: "keep only preferred entries",
            },
            OptionDoc {
                name: "unsafe_pruning",
                type_name: "bool",
                default: Some("true"),
                doc: "let the first evaluator alone declare dead ends",
            },
        ],
    },
    FeatureDoc {
        name: "alt",
        synopsis: "Round-robin alternation over child open lists.",
        options: &[
            OptionDoc {
                name: "lists",
                type_name: "list of open lists",
                default: None,
                doc: "the children",
            },
            OptionDoc {
                name: "boost",
                type_name: "int",
                default: Some("1000"),
                doc: "priority bonus for preferred-only children on progress",
            },
        ],
    },
    FeatureDoc {
        name: "eager",
        synopsis: "Eager best-first graph search.",
        options: &[
            OptionDoc {
                name: "open",
                type_name: "open list",
                default: None,
                doc: "the open list",
            },
            OptionDoc {
                name: "reopen_closed",
                type_name: "bool",
                default: Some("false"),
                doc: "reopen closed nodes on cheaper paths",
            },
            OptionDoc {
                name: "f_eval",
                type_name: "evaluator",
                default: Some("<none>"),
                doc: "evaluator for f-value progress reporting",
            },
            OptionDoc {
                name: "preferred",
                type_name: "list of evaluators",
                default: Some("[]"),
                doc: "evaluators asked for preferred operators",
            },
            OptionDoc {
                name: "lazy_evaluator",
                type_name: "evaluator",
                default: Some("<none>"),
                doc: "re-evaluate states on expansion (must cache estimates)",
            },
            OptionDoc {
                name: "bound",
                type_name: "int or infinity",
                default: Some("infinity"),
                doc: "strict cost ceiling on plans",
            },
            OptionDoc {
                name: "max_time",
                type_name: "seconds or infinity",
                default: Some("infinity"),
                doc: "wall-clock budget",
            },
            OptionDoc {
                name: "cost_type",
                type_name: "normal|one|plusone",
                default: Some("normal"),
                doc: "cost adjustment for g-values",
            },
        ],
    },
    FeatureDoc {
        name: "iterated",
        synopsis: "Run engine configurations in sequence, tightening the bound.",
        options: &[
            OptionDoc {
                name: "engine_configs",
                type_name: "list of search engines",
                default: None,
                doc: "one configuration per iteration",
            },
            OptionDoc {
                name: "pass_bound",
                type_name: "bool",
                default: Some("true"),
                doc: "hand the best cost so far to each iteration",
            },
            OptionDoc {
                name: "repeat_last",
                type_name: "bool",
                default: Some("false"),
                doc: "repeat the last configuration while it keeps solving",
            },
            OptionDoc {
                name: "continue_on_fail",
                type_name: "bool",
                default: Some("false"),
                doc: "keep iterating after a failed iteration",
            },
            OptionDoc {
                name: "continue_on_solve",
                type_name: "bool",
                default: Some("true"),
                doc: "keep iterating after a solved iteration",
            },
            OptionDoc {
                name: "bound",
                type_name: "int or infinity",
                default: Some("infinity"),
                doc: "initial cost ceiling",
            },
            OptionDoc {
                name: "max_time",
                type_name: "seconds or infinity",
                default: Some("infinity"),
                doc: "wall-clock budget for the whole iteration",
            },
        ],
    },
];

/// Render the feature documentation for `--help`.
#[must_use]
pub fn help_text() -> String {
    let mut text = String::from("Registered features:\n");
    for feature in FEATURES {
        text.push_str(&format!("\n  {} — {}\n", feature.name, feature.synopsis));
        for option in feature.options {
            let default = option
                .default
                .map_or_else(|| "required".to_string(), |d| format!("default: {d}"));
            text.push_str(&format!(
                "      {} ({}, {}): {}\n",
                option.name, option.type_name, default, option.doc
            ));
        }
    }
    text
}

/// Parsed arguments of one feature call.
pub struct Args {
    feature: String,
    positional: VecDeque<Value>,
    named: Vec<(String, Value)>,
}

impl Args {
    #[must_use]
    pub fn new(feature: String, positional: VecDeque<Value>, named: Vec<(String, Value)>) -> Self {
        Self {
            feature,
            positional,
            named,
        }
    }

    /// Bind the next value for `option`: by name if given, otherwise the
    /// next positional argument. Options are taken in declaration order,
    /// which is what binds positional arguments correctly.
    fn take(&mut self, option: &str) -> Result<Option<Value>, ConfigError> {
        if let Some(index) = self.named.iter().position(|(name, _)| name == option) {
            if !self.positional.is_empty() {
                return Err(ConfigError::DuplicateOption {
                    feature: self.feature.clone(),
                    option: option.to_string(),
                });
            }
            return Ok(Some(self.named.remove(index).1));
        }
        Ok(self.positional.pop_front())
    }

    fn required(&mut self, option: &str) -> Result<Value, ConfigError> {
        self.take(option)?.ok_or_else(|| ConfigError::MissingOption {
            feature: self.feature.clone(),
            option: option.to_string(),
        })
    }

    fn type_error(&self, option: &str, expected: &str, found: &Value) -> ConfigError {
        ConfigError::OptionType {
            feature: self.feature.clone(),
            option: option.to_string(),
            expected: expected.to_string(),
            found: found.kind().to_string(),
        }
    }

    fn evaluator(&mut self, option: &str) -> Result<Rc<EvaluatorFactory>, ConfigError> {
        match self.required(option)? {
            Value::Evaluator(factory) => Ok(factory),
            other => Err(self.type_error(option, "an evaluator", &other)),
        }
    }

    fn opt_evaluator(&mut self, option: &str) -> Result<Option<Rc<EvaluatorFactory>>, ConfigError> {
        match self.take(option)? {
            None => Ok(None),
            Some(Value::Evaluator(factory)) => Ok(Some(factory)),
            Some(other) => Err(self.type_error(option, "an evaluator", &other)),
        }
    }

    fn evaluator_list(&mut self, option: &str) -> Result<Vec<Rc<EvaluatorFactory>>, ConfigError> {
        match self.required(option)? {
            Value::List(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Evaluator(factory) => Ok(factory),
                    other => Err(self.type_error(option, "a list of evaluators", &other)),
                })
                .collect(),
            other => Err(self.type_error(option, "a list of evaluators", &other)),
        }
    }

    fn opt_evaluator_list(
        &mut self,
        option: &str,
    ) -> Result<Vec<Rc<EvaluatorFactory>>, ConfigError> {
        match self.take(option)? {
            None => Ok(Vec::new()),
            Some(Value::List(items)) => items
                .into_iter()
                .map(|item| match item {
                    Value::Evaluator(factory) => Ok(factory),
                    other => Err(self.type_error(option, "a list of evaluators", &other)),
                })
                .collect(),
            Some(other) => Err(self.type_error(option, "a list of evaluators", &other)),
        }
    }

    fn open_list(&mut self, option: &str) -> Result<Rc<OpenListFactory>, ConfigError> {
        match self.required(option)? {
            Value::OpenList(factory) => Ok(factory),
            other => Err(self.type_error(option, "an open list", &other)),
        }
    }

    fn open_list_list(&mut self, option: &str) -> Result<Vec<Rc<OpenListFactory>>, ConfigError> {
        match self.required(option)? {
            Value::List(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::OpenList(factory) => Ok(factory),
                    other => Err(self.type_error(option, "a list of open lists", &other)),
                })
                .collect(),
            other => Err(self.type_error(option, "a list of open lists", &other)),
        }
    }

    fn engine_list(&mut self, option: &str) -> Result<Vec<Rc<SearchEngineFactory>>, ConfigError> {
        match self.required(option)? {
            Value::List(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Engine(factory) => Ok(factory),
                    other => Err(self.type_error(option, "a list of search engines", &other)),
                })
                .collect(),
            other => Err(self.type_error(option, "a list of search engines", &other)),
        }
    }

    fn int(&mut self, option: &str) -> Result<i64, ConfigError> {
        match self.required(option)? {
            Value::Int(value) => Ok(value),
            other => Err(self.type_error(option, "an integer", &other)),
        }
    }

    fn opt_bool(&mut self, option: &str, default: bool) -> Result<bool, ConfigError> {
        match self.take(option)? {
            None => Ok(default),
            Some(Value::Bool(value)) => Ok(value),
            Some(other) => Err(self.type_error(option, "a boolean", &other)),
        }
    }

    fn opt_i64(&mut self, option: &str, default: i64) -> Result<i64, ConfigError> {
        match self.take(option)? {
            None => Ok(default),
            Some(Value::Int(value)) => Ok(value),
            Some(other) => Err(self.type_error(option, "an integer", &other)),
        }
    }

    fn opt_bound(&mut self, option: &str) -> Result<i32, ConfigError> {
        match self.take(option)? {
            None | Some(Value::Infinity) => Ok(INFTY),
            Some(Value::Int(value)) if (0..i64::from(INFTY)).contains(&value) => Ok(value as i32),
            Some(Value::Int(value)) => Err(ConfigError::InvalidOption {
                feature: self.feature.clone(),
                option: option.to_string(),
                detail: format!("bound {value} out of range"),
            }),
            Some(other) => Err(self.type_error(option, "an integer or infinity", &other)),
        }
    }

    fn opt_max_time(&mut self, option: &str) -> Result<Option<Duration>, ConfigError> {
        let seconds = match self.take(option)? {
            None | Some(Value::Infinity) => return Ok(None),
            Some(Value::Int(value)) => value as f64,
            Some(Value::Float(value)) => value,
            Some(other) => Err(self.type_error(option, "seconds or infinity", &other))?,
        };
        if seconds < 0.0 || !seconds.is_finite() {
            return Err(ConfigError::InvalidOption {
                feature: self.feature.clone(),
                option: option.to_string(),
                detail: format!("invalid time limit {seconds}"),
            });
        }
        Ok(Some(Duration::from_secs_f64(seconds)))
    }

    fn opt_cost_type(&mut self, option: &str) -> Result<CostType, ConfigError> {
        match self.take(option)? {
            None => Ok(CostType::Normal),
            Some(Value::Symbol(symbol)) => match symbol.as_str() {
                "normal" => Ok(CostType::Normal),
                "one" => Ok(CostType::One),
                "plusone" => Ok(CostType::PlusOne),
                other => Err(ConfigError::InvalidOption {
                    feature: self.feature.clone(),
                    option: option.to_string(),
                    detail: format!("unknown cost type `{other}`"),
                }),
            },
            Some(other) => Err(self.type_error(option, "normal|one|plusone", &other)),
        }
    }

    /// All arguments must have been consumed.
    fn finish(self) -> Result<(), ConfigError> {
        if let Some(value) = self.positional.front() {
            return Err(ConfigError::SurplusArgument {
                feature: self.feature,
                argument: value.kind().to_string(),
            });
        }
        if let Some((name, _)) = self.named.first() {
            return Err(ConfigError::SurplusArgument {
                feature: self.feature.clone(),
                argument: name.clone(),
            });
        }
        Ok(())
    }

    fn int_in_i32(&self, option: &str, value: i64) -> Result<i32, ConfigError> {
        i32::try_from(value).map_err(|_| ConfigError::InvalidOption {
            feature: self.feature.clone(),
            option: option.to_string(),
            detail: format!("{value} out of range"),
        })
    }
}

/// Bind one feature call.
///
/// # Errors
///
/// Returns [`ConfigError`] for unknown features and option-binding
/// failures.
pub fn construct(mut args: Args) -> Result<Value, ConfigError> {
    let feature = args.feature.clone();
    let value = match feature.as_str() {
        "g" => Value::Evaluator(Rc::new(EvaluatorFactory::G)),
        "const" => {
            let raw = args.opt_i64("value", 1)?;
            let value = args.int_in_i32("value", raw)?;
            if value < 0 {
                return Err(ConfigError::InvalidOption {
                    feature,
                    option: "value".into(),
                    detail: "must be nonnegative".into(),
                });
            }
            Value::Evaluator(Rc::new(EvaluatorFactory::Const(value)))
        }
        "pref" => Value::Evaluator(Rc::new(EvaluatorFactory::Pref)),
        "weight" => {
            let evaluator = args.evaluator("eval")?;
            let raw = args.int("weight")?;
            let weight = args.int_in_i32("weight", raw)?;
            Value::Evaluator(Rc::new(EvaluatorFactory::Weighted { evaluator, weight }))
        }
        "sum" => Value::Evaluator(Rc::new(EvaluatorFactory::Sum(args.evaluator_list("evals")?))),
        "max" => Value::Evaluator(Rc::new(EvaluatorFactory::Max(args.evaluator_list("evals")?))),
        "blind" => Value::Evaluator(Rc::new(EvaluatorFactory::Heuristic {
            factory: Box::new(BlindFactory),
            cache_estimates: args.opt_bool("cache_estimates", true)?,
        })),
        "goalcount" => Value::Evaluator(Rc::new(EvaluatorFactory::Heuristic {
            factory: Box::new(GoalCountFactory),
            cache_estimates: args.opt_bool("cache_estimates", true)?,
        })),
        "single" => Value::OpenList(Rc::new(OpenListFactory::BestFirst {
            evaluator: args.evaluator("eval")?,
            pref_only: args.opt_bool("pref_only", false)?,
        })),
        "tiebreaking" => Value::OpenList(Rc::new(OpenListFactory::TieBreaking {
            evaluators: args.evaluator_list("evals")?,
            pref_only: args.opt_bool("pref_only", false)?,
            unsafe_pruning: args.opt_bool("unsafe_pruning", true)?,
        })),
        "alt" => Value::OpenList(Rc::new(OpenListFactory::Alternation {
            sublists: args.open_list_list("lists")?,
            boost: args.opt_i64("boost", 1000)?,
        })),
        "eager" => {
            let open_list = args.open_list("open")?;
            let mut eager = EagerFactory::new(open_list);
            eager.reopen_closed = args.opt_bool("reopen_closed", false)?;
            eager.f_evaluator = args.opt_evaluator("f_eval")?;
            eager.preferred = args.opt_evaluator_list("preferred")?;
            eager.lazy_evaluator = args.opt_evaluator("lazy_evaluator")?;
            eager.bound = args.opt_bound("bound")?;
            eager.max_time = args.opt_max_time("max_time")?;
            eager.cost_type = args.opt_cost_type("cost_type")?;
            Value::Engine(Rc::new(SearchEngineFactory::Eager(eager)))
        }
        "iterated" => {
            let engine_factories = args.engine_list("engine_configs")?;
            let options = IteratedSearchOptions {
                pass_bound: args.opt_bool("pass_bound", true)?,
                repeat_last: args.opt_bool("repeat_last", false)?,
                continue_on_fail: args.opt_bool("continue_on_fail", false)?,
                continue_on_solve: args.opt_bool("continue_on_solve", true)?,
                bound: args.opt_bound("bound")?,
                max_time: args.opt_max_time("max_time")?,
            };
            Value::Engine(Rc::new(SearchEngineFactory::Iterated(IteratedFactory {
                engine_factories,
                options,
            })))
        }
        _ => return Err(ConfigError::UnknownFeature { name: feature }),
    };
    args.finish()?;
    Ok(value)
}
