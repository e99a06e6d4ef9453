//! The Pipeline Driver (§4.4): owns a single AST for the lifetime of a run
//! and executes a flattened recipe against it, dispatching each step to
//! either a built-in pass or the Transform Runtime.

use std::time::Instant;

use jsdeob_ast::json::{json_to_program, program_to_json};
use jsdeob_ast::model::{LogEntry, RunReport, StepResult, AST_SENTINEL};
use jsdeob_ast::services::{format, generate_program, parse, Ast, MAX_NESTING_DEPTH};
use jsdeob_ast::{model::TransformKind, nesting_depth};
use jsdeob_runtime::{run_transform, RuntimePolicy, TransformInput};
use serde_json::Value;

use crate::error::{PipelineError, PipelineResult};
use crate::flatten::{flatten, validate_recipe, FlatStep};

/// Result of running a single flattened step to completion.
pub struct StepRunOutcome {
    pub step_result: StepResult,
    pub current_code: String,
    pub total_steps: usize,
}

struct StepExec {
    stats: Value,
    logs: Vec<LogEntry>,
    /// `Some` when this step's code was printed as part of executing it
    /// (either because it was the batch's last step, or step-mode always
    /// materializes) — avoids a second print just for the result record.
    code_if_materialized: Option<String>,
}

/// Runs recipes against a single owned AST per run (§5: "the core is
/// single-threaded per run"). Stateless itself beyond the Transform Runtime
/// policy, so one driver can be reused (or cheaply recreated) across runs.
#[derive(Clone)]
pub struct PipelineDriver {
    policy: RuntimePolicy,
}

impl PipelineDriver {
    pub fn new(policy: RuntimePolicy) -> Self {
        Self { policy }
    }

    /// Batch-mode execution (§4.4): parses once, runs every flattened step
    /// in order, and returns either the final code or, on the first
    /// failure, a partial report with `currentCode` as of the last
    /// successful step.
    pub fn run_batch(&self, source: &str, recipe: &jsdeob_ast::model::Recipe) -> PipelineResult<RunReport> {
        validate_recipe(recipe)?;
        if nesting_depth(source, MAX_NESTING_DEPTH) > MAX_NESTING_DEPTH {
            return Err(PipelineError::DeeplyNested);
        }

        let formatted_input = format(source).unwrap_or_else(|_| source.to_string());
        let flat = flatten(recipe);
        if flat.is_empty() {
            return Ok(RunReport {
                success: true,
                final_code: Some(formatted_input),
                failed_at: None,
                error: None,
                results: Vec::new(),
            });
        }

        let mut ast = parse(source).map_err(|e| PipelineError::Parse(e.to_string()))?;
        let last_index = flat.len() - 1;
        let mut results = Vec::with_capacity(flat.len());

        for (i, step) in flat.iter().enumerate() {
            let is_last = i == last_index;
            let start = Instant::now();
            match self.execute_step(&mut ast, step, is_last) {
                Ok(exec) => {
                    let duration_ms = start.elapsed().as_millis() as u64;
                    let (code, code_size) = match &exec.code_if_materialized {
                        Some(printed) => (Some(printed.clone()), printed.len()),
                        None => {
                            let size = generate_program(&ast.program).map(|c| c.len()).unwrap_or(0);
                            (Some(AST_SENTINEL.to_string()), size)
                        }
                    };
                    results.push(StepResult {
                        index: i,
                        transform_id: step.transform_step.id.clone(),
                        success: true,
                        skipped: false,
                        stats: exec.stats,
                        logs: exec.logs,
                        duration_ms,
                        code_size,
                        code,
                    });

                    if is_last {
                        let final_code = exec
                            .code_if_materialized
                            .unwrap_or_else(|| generate_program(&ast.program).unwrap_or_default());
                        return Ok(RunReport {
                            success: true,
                            final_code: Some(final_code),
                            failed_at: None,
                            error: None,
                            results,
                        });
                    }
                }
                Err(e) => {
                    let duration_ms = start.elapsed().as_millis() as u64;
                    let current_code = generate_program(&ast.program).unwrap_or_default();
                    results.push(StepResult {
                        index: i,
                        transform_id: step.transform_step.id.clone(),
                        success: false,
                        skipped: false,
                        stats: serde_json::json!({}),
                        logs: Vec::new(),
                        duration_ms,
                        code_size: current_code.len(),
                        code: Some(current_code.clone()),
                    });
                    return Ok(RunReport {
                        success: false,
                        final_code: None,
                        failed_at: Some(i),
                        error: Some(e.to_string()),
                        results,
                    });
                }
            }
        }

        unreachable!("loop above always returns on the last flattened step")
    }

    /// Step-mode execution (§4.4): parses `source` fresh (the caller's
    /// `currentCode` from a prior call), runs only `step_index` of the
    /// flattened recipe, and always materializes `currentCode`. Resuming is
    /// the caller's responsibility: submit `current_code` back as `source`
    /// with `step_index + 1`.
    pub fn run_step(
        &self,
        source: &str,
        recipe: &jsdeob_ast::model::Recipe,
        step_index: usize,
    ) -> PipelineResult<StepRunOutcome> {
        validate_recipe(recipe)?;
        let flat = flatten(recipe);
        let step = flat.get(step_index).ok_or_else(|| {
            PipelineError::Unsupported(format!(
                "step index {step_index} out of range (0..{})",
                flat.len()
            ))
        })?;
        if nesting_depth(source, MAX_NESTING_DEPTH) > MAX_NESTING_DEPTH {
            return Err(PipelineError::DeeplyNested);
        }

        let mut ast = parse(source).map_err(|e| PipelineError::Parse(e.to_string()))?;
        let start = Instant::now();
        let exec = self.execute_step(&mut ast, step, true)?;
        let duration_ms = start.elapsed().as_millis() as u64;
        let code = exec.code_if_materialized.unwrap_or_default();

        let step_result = StepResult {
            index: step_index,
            transform_id: step.transform_step.id.clone(),
            success: true,
            skipped: false,
            stats: exec.stats,
            logs: exec.logs,
            duration_ms,
            code_size: code.len(),
            code: Some(code.clone()),
        };

        Ok(StepRunOutcome {
            step_result,
            current_code: code,
            total_steps: flat.len(),
        })
    }

    /// Executes one flattened step against `ast`. `want_code` requests that
    /// the step's resulting code be printed as part of executing it (the
    /// batch's last step, or any step-mode call) rather than only updating
    /// the AST in place.
    fn execute_step(&self, ast: &mut Ast, step: &FlatStep, want_code: bool) -> PipelineResult<StepExec> {
        let transform = &step.transform_step;
        let config = &transform.config;

        match transform.kind {
            TransformKind::Builtin => {
                let stats = jsdeob_passes::dispatch(&transform.id, &mut ast.program, config)
                    .map_err(|e| PipelineError::StepFailure(e.to_string()))?;
                let code_if_materialized = if want_code {
                    Some(
                        generate_program(&ast.program)
                            .map_err(|e| PipelineError::StepFailure(e.to_string()))?,
                    )
                } else {
                    None
                };
                Ok(StepExec { stats, logs: Vec::new(), code_if_materialized })
            }
            TransformKind::Plugin | TransformKind::Script | TransformKind::Inline => {
                let code_src = transform.code.as_deref().ok_or_else(|| {
                    PipelineError::StepFailure(format!("transform `{}` has no source code", transform.id))
                })?;
                let ast_json = program_to_json(&ast.program).map_err(|e| PipelineError::Internal(e.to_string()))?;
                let return_ast = !want_code;

                let outcome = run_transform(
                    TransformInput::Ast(&ast_json),
                    code_src,
                    config,
                    return_ast,
                    &self.policy,
                )
                .map_err(|e| PipelineError::StepFailure(e.to_string()))?;

                if return_ast {
                    let new_json = outcome
                        .ast
                        .ok_or_else(|| PipelineError::Internal("runtime did not return an ast".into()))?;
                    ast.program = json_to_program(new_json).map_err(|e| PipelineError::Internal(e.to_string()))?;
                    Ok(StepExec { stats: outcome.stats, logs: outcome.logs, code_if_materialized: None })
                } else {
                    let printed = outcome
                        .code
                        .ok_or_else(|| PipelineError::Internal("runtime did not return code".into()))?;
                    Ok(StepExec { stats: outcome.stats, logs: outcome.logs, code_if_materialized: Some(printed) })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsdeob_ast::model::{Recipe, RecipeStep, TransformKind, TransformStep};
    use serde_json::json;

    fn builtin_step(id: &str, config: Value) -> RecipeStep {
        RecipeStep::Transform(TransformStep {
            id: id.to_string(),
            kind: TransformKind::Builtin,
            code: None,
            config,
            enabled: true,
            iterations: 1,
        })
    }

    fn driver() -> PipelineDriver {
        PipelineDriver::new(RuntimePolicy::default())
    }

    #[test]
    fn empty_recipe_returns_formatted_input() {
        let report = driver().run_batch("var x=1;", &Recipe { steps: vec![] }).unwrap();
        assert!(report.success);
        assert!(report.results.is_empty());
        assert!(report.final_code.unwrap().contains("var x"));
    }

    #[test]
    fn runs_constant_folding_end_to_end() {
        let recipe = Recipe { steps: vec![builtin_step("constantFolding", json!({}))] };
        let report = driver().run_batch("var x = 1 + 2 + 3;", &recipe).unwrap();
        assert!(report.success);
        assert_eq!(report.results.len(), 1);
        assert!(report.final_code.unwrap().contains('6'));
    }

    #[test]
    fn unknown_builtin_id_fails_the_step() {
        let recipe = Recipe { steps: vec![builtin_step("doesNotExist", json!({}))] };
        let report = driver().run_batch("var x = 1;", &recipe).unwrap();
        assert!(!report.success);
        assert_eq!(report.failed_at, Some(0));
        assert_eq!(report.results.len(), 1);
        assert!(!report.results[0].success);
    }

    #[test]
    fn middle_steps_carry_ast_sentinel_not_materialized_code() {
        let recipe = Recipe {
            steps: vec![
                builtin_step("constantFolding", json!({})),
                builtin_step("simplifyLiterals", json!({})),
            ],
        };
        let report = driver().run_batch("var x = 1 + 2;", &recipe).unwrap();
        assert!(report.success);
        assert_eq!(report.results[0].code.as_deref(), Some(AST_SENTINEL));
        assert_ne!(report.results[1].code.as_deref(), Some(AST_SENTINEL));
    }

    #[test]
    fn step_mode_runs_a_single_step_and_returns_current_code() {
        let recipe = Recipe {
            steps: vec![
                builtin_step("constantFolding", json!({})),
                builtin_step("simplifyLiterals", json!({})),
            ],
        };
        let outcome = driver().run_step("var x = 1 + 2;", &recipe, 0).unwrap();
        assert_eq!(outcome.total_steps, 2);
        assert!(outcome.current_code.contains('3'));
    }

    #[test]
    fn deeply_nested_input_is_rejected_before_parsing() {
        let nested = "(".repeat(600) + ")".repeat(600).as_str();
        let recipe = Recipe { steps: vec![builtin_step("constantFolding", json!({}))] };
        let result = driver().run_batch(&nested, &recipe);
        assert!(matches!(result, Err(PipelineError::DeeplyNested)));
    }
}
