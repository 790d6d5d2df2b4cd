//! Attach AI explanations and fixes to reviewed issues

use super::client::AiClient;
use super::prompts::{code_context, explain_prompt, fix_prompt, parse_fix, SYSTEM_PROMPT};
use super::AiResult;
use crate::models::{Issue, ReviewResult};
use rustc_hash::FxHashMap;
use std::cmp::Reverse;
use tracing::{debug, warn};

/// Something that can explain an issue and propose a fix
pub trait IssueEnhancer {
    fn explain(&self, issue: &Issue, context: Option<&str>) -> AiResult<String>;
    fn suggest_fix(&self, issue: &Issue, context: Option<&str>) -> AiResult<String>;
}

/// [`IssueEnhancer`] backed by an LLM
pub struct AiEnhancer {
    client: AiClient,
}

impl AiEnhancer {
    pub fn new(client: AiClient) -> Self {
        Self { client }
    }
}

impl IssueEnhancer for AiEnhancer {
    fn explain(&self, issue: &Issue, context: Option<&str>) -> AiResult<String> {
        let prompt = explain_prompt(issue, context);
        let text = self.client.complete(SYSTEM_PROMPT, &prompt)?;
        Ok(text.trim().to_string())
    }

    fn suggest_fix(&self, issue: &Issue, context: Option<&str>) -> AiResult<String> {
        let prompt = fix_prompt(issue, context);
        let text = self.client.complete(SYSTEM_PROMPT, &prompt)?;
        Ok(parse_fix(&text))
    }
}

/// Outcome counts of one enhancement pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnhanceStats {
    pub attempted: usize,
    pub enhanced: usize,
    pub failed: usize,
}

/// Enhance up to `max_issues` issues, most severe first.
///
/// Context lines are read from the issue's file when it exists on disk.
/// Failures are logged and counted; they never stop the pass. Each issue
/// keeps any AI text it already had.
pub fn enhance_result(
    result: &mut ReviewResult,
    enhancer: &dyn IssueEnhancer,
    max_issues: usize,
) -> EnhanceStats {
    let mut order: Vec<(usize, usize)> = result
        .files
        .iter()
        .enumerate()
        .flat_map(|(f, file)| (0..file.issues.len()).map(move |i| (f, i)))
        .collect();
    // Stable: ties keep file then detection order.
    order.sort_by_key(|&(f, i)| Reverse(result.files[f].issues[i].severity));
    order.truncate(max_issues);

    let mut sources: FxHashMap<String, Option<String>> = FxHashMap::default();
    let mut stats = EnhanceStats::default();

    for (f, i) in order {
        let issue = &mut result.files[f].issues[i];
        if issue.ai_explanation().is_some() && issue.ai_fix().is_some() {
            continue;
        }
        stats.attempted += 1;

        let source = sources
            .entry(issue.file.clone())
            .or_insert_with(|| std::fs::read_to_string(&issue.file).ok());
        let context = source.as_deref().map(|s| code_context(s, issue.line));

        let explained = enhancer.explain(issue, context.as_deref());
        let fixed = enhancer.suggest_fix(issue, context.as_deref());

        let mut ok = true;
        match explained {
            Ok(text) => {
                issue.set_ai_explanation(text);
            }
            Err(e) => {
                warn!("AI explanation failed for {}:{}: {}", issue.file, issue.line, e);
                ok = false;
            }
        }
        match fixed {
            Ok(text) => {
                issue.set_ai_fix(text);
            }
            Err(e) => {
                warn!("AI fix failed for {}:{}: {}", issue.file, issue.line, e);
                ok = false;
            }
        }
        if ok {
            stats.enhanced += 1;
        } else {
            stats.failed += 1;
        }
    }

    debug!(
        "AI enhancement: {} attempted, {} enhanced, {} failed",
        stats.attempted, stats.enhanced, stats.failed
    );
    stats
}
