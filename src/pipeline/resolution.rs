//! The resolution scope: direct binding lookup, assignable-service
//! search, and resolve-all fan-out.

use std::sync::{Arc, Mutex};

use crate::injector::{Injector, ResolveState};
use crate::pipeline::{action, PipelineContext, Scope};
use crate::provider::AnyArc;
use crate::token::Token;

/// Whether a resolution wants one instance or the full fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    /// Stop at the first matching binding
    One,
    /// Collect every matching binding, in discovery order
    All,
}

/// Context shared by the resolution scope's actions.
pub struct ResolutionContext {
    /// Injector the request started from
    pub injector: Injector,
    /// Requested token
    pub token: Token,
    pub mode: ResolveMode,
    /// Single-result slot; setting it short-circuits the chain
    pub result: Option<AnyArc>,
    /// Fan-out results, in discovery order
    pub results: Vec<AnyArc>,
    pub(crate) state: Arc<Mutex<ResolveState>>,
}

impl ResolutionContext {
    pub(crate) fn new(
        injector: Injector,
        token: Token,
        mode: ResolveMode,
        state: Arc<Mutex<ResolveState>>,
    ) -> Self {
        Self { injector, token, mode, result: None, results: Vec::new(), state }
    }
}

impl PipelineContext for ResolutionContext {
    fn short_circuited(&self) -> bool {
        self.mode == ResolveMode::One && self.result.is_some()
    }
}

/// Builds the default resolution scope:
///
/// 1. `direct-binding` — exact token in this injector, then ancestors;
///    found means done (the action does not call `next`).
/// 2. `assignable-service` — first provider advertising the token via
///    `provides`, in fan-out order.
/// 3. `resolve-all` — collects every match instead of stopping at one;
///    only participates in [`ResolveMode::All`].
pub fn default_resolution_scope() -> Scope<ResolutionContext> {
    let mut scope = Scope::new("resolution");

    scope.use_action(action(
        "direct-binding",
        |ctx: &mut ResolutionContext, next| {
            if ctx.mode == ResolveMode::All {
                return next(ctx);
            }
            match ctx.injector.find_exact(&ctx.token) {
                Some((owner, binding)) => {
                    let value = ctx.injector.construct_binding(
                        &owner,
                        &binding,
                        &ctx.token,
                        &ctx.state,
                    )?;
                    ctx.result = Some(value);
                    // Found it, stop searching.
                    Ok(())
                }
                None => next(ctx),
            }
        },
    ));

    scope.use_action(action(
        "assignable-service",
        |ctx: &mut ResolutionContext, next| {
            if ctx.mode == ResolveMode::All {
                return next(ctx);
            }
            let discovered = ctx.injector.discover(&ctx.token);
            match discovered.into_iter().next() {
                Some((owner, bound_token, binding)) => {
                    let value = ctx.injector.construct_binding(
                        &owner,
                        &binding,
                        &bound_token,
                        &ctx.state,
                    )?;
                    ctx.result = Some(value);
                    Ok(())
                }
                None => next(ctx),
            }
        },
    ));

    scope.use_action(action(
        "resolve-all",
        |ctx: &mut ResolutionContext, next| {
            if ctx.mode == ResolveMode::One {
                return next(ctx);
            }
            let discovered = ctx.injector.discover(&ctx.token);
            for (owner, bound_token, binding) in discovered {
                let value = ctx.injector.construct_binding(
                    &owner,
                    &binding,
                    &bound_token,
                    &ctx.state,
                )?;
                ctx.results.push(value);
            }
            Ok(())
        },
    ));

    scope
}
