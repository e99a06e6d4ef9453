//! Recipe flattening (§4.4): expands loops into their repeated children and
//! drops disabled steps, producing the strict execution order the driver
//! runs in.

use jsdeob_ast::model::{Recipe, RecipeStep, TransformStep, MAX_ITERATIONS};

use crate::error::{PipelineError, PipelineResult};

/// One transform invocation in flattened execution order, carrying a link
/// back to the top-level recipe position it originated from so the host can
/// correlate results with the recipe it submitted (§4.4).
#[derive(Debug, Clone)]
pub struct FlatStep {
    pub transform_step: TransformStep,
    pub origin_index: usize,
}

/// Rejects iteration counts above [`MAX_ITERATIONS`] before flattening.
/// Nested loops are impossible by construction: [`RecipeStep::Loop`]'s
/// children are `TransformStep`s, not `RecipeStep`s, so there is no
/// `Unsupported: nested loops` case to detect here.
pub fn validate_recipe(recipe: &Recipe) -> PipelineResult<()> {
    for step in &recipe.steps {
        match step {
            RecipeStep::Transform(t) => check_iterations(&t.id, t.iterations)?,
            RecipeStep::Loop(l) => {
                check_iterations("loop", l.iterations)?;
                for child in &l.children {
                    check_iterations(&child.id, child.iterations)?;
                }
            }
        }
    }
    Ok(())
}

fn check_iterations(label: &str, iterations: u32) -> PipelineResult<()> {
    if iterations > MAX_ITERATIONS {
        return Err(PipelineError::Unsupported(format!(
            "`{label}` requests {iterations} iterations (max {MAX_ITERATIONS})"
        )));
    }
    Ok(())
}

/// Flattens `recipe` into execution order: `Loop{iterations, children}`
/// becomes `iterations` repetitions of each enabled child, each itself
/// repeated by its own `iterations`; disabled top-level steps and disabled
/// loop children are omitted entirely.
pub fn flatten(recipe: &Recipe) -> Vec<FlatStep> {
    let mut out = Vec::new();
    for (origin_index, step) in recipe.steps.iter().enumerate() {
        match step {
            RecipeStep::Transform(t) => {
                if !t.enabled {
                    continue;
                }
                push_repeated(&mut out, t, origin_index);
            }
            RecipeStep::Loop(l) => {
                if !l.enabled {
                    continue;
                }
                for _ in 0..l.iterations {
                    for child in &l.children {
                        if !child.enabled {
                            continue;
                        }
                        push_repeated(&mut out, child, origin_index);
                    }
                }
            }
        }
    }
    out
}

fn push_repeated(out: &mut Vec<FlatStep>, transform_step: &TransformStep, origin_index: usize) {
    for _ in 0..transform_step.iterations {
        out.push(FlatStep {
            transform_step: transform_step.clone(),
            origin_index,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsdeob_ast::model::TransformKind;
    use serde_json::json;

    fn transform_step(id: &str, enabled: bool, iterations: u32) -> TransformStep {
        TransformStep {
            id: id.to_string(),
            kind: TransformKind::Builtin,
            code: None,
            config: json!({}),
            enabled,
            iterations,
        }
    }

    #[test]
    fn omits_disabled_top_level_steps() {
        let recipe = Recipe {
            steps: vec![
                RecipeStep::Transform(transform_step("a", true, 1)),
                RecipeStep::Transform(transform_step("b", false, 1)),
            ],
        };
        let flat = flatten(&recipe);
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].transform_step.id, "a");
    }

    #[test]
    fn expands_loop_iterations_times_children() {
        use jsdeob_ast::model::LoopStep;
        let recipe = Recipe {
            steps: vec![RecipeStep::Loop(LoopStep {
                iterations: 3,
                enabled: true,
                children: vec![transform_step("a", true, 1), transform_step("b", false, 1)],
            })],
        };
        let flat = flatten(&recipe);
        assert_eq!(flat.len(), 3);
        assert!(flat.iter().all(|s| s.transform_step.id == "a"));
        assert!(flat.iter().all(|s| s.origin_index == 0));
    }

    #[test]
    fn one_iteration_loop_with_one_child_equals_top_level_step() {
        use jsdeob_ast::model::LoopStep;
        let looped = Recipe {
            steps: vec![RecipeStep::Loop(LoopStep {
                iterations: 1,
                enabled: true,
                children: vec![transform_step("a", true, 1)],
            })],
        };
        let top_level = Recipe {
            steps: vec![RecipeStep::Transform(transform_step("a", true, 1))],
        };
        let flat_looped = flatten(&looped);
        let flat_top = flatten(&top_level);
        assert_eq!(flat_looped.len(), flat_top.len());
        assert_eq!(flat_looped[0].transform_step.id, flat_top[0].transform_step.id);
    }

    #[test]
    fn rejects_iterations_above_max() {
        let recipe = Recipe {
            steps: vec![RecipeStep::Transform(transform_step("a", true, MAX_ITERATIONS + 1))],
        };
        assert!(validate_recipe(&recipe).is_err());
    }
}
