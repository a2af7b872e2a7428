//! Invocation wrapper: bind a program image, arguments, a gas limit and a
//! host handler into one machine run and collapse the outcome.

use jam_asm::ProgramImage;

use crate::consts::{REG_A0, REG_A1};
use crate::error::InvocationError;
use crate::host::implications::AccumulateContext;
use crate::host::HostHandler;
use crate::interpreter::Interpreter;
use crate::state::ExitReason;

/// Collapsed result of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResult<C> {
    /// Gas consumed: the limit minus the non-negative remainder, or the
    /// whole limit on gas exhaustion.
    pub gas_used: u64,
    /// The result blob on a successful halt, or the collapsed error.
    pub outcome: Result<Vec<u8>, InvocationError>,
    /// The context, as the host handler left it.
    pub context: C,
}

/// Run one invocation against an opaque context.
///
/// The preimage is decoded into code, bitmask, jump table and data
/// segments; memory and registers are initialized to the standard layout
/// with `args` in the argument region; then the machine runs until it
/// terminates. A malformed preimage is reported as a panic with zero gas
/// consumed, before any instruction executes.
///
/// On halt the result blob is read from the memory range held in the two
/// argument registers; if that range is not fully readable the result is
/// the empty blob.
pub fn invoke<C, E>(
    preimage: &[u8],
    entry_pc: u64,
    gas_limit: u64,
    args: &[u8],
    host: E,
    context: C,
) -> InvocationResult<C>
where
    E: HostHandler<C>,
{
    let image = match ProgramImage::from_preimage(preimage) {
        Ok(image) => image,
        Err(error) => {
            tracing::debug!(%error, "malformed program image");
            return InvocationResult {
                gas_used: 0,
                outcome: Err(error.into()),
                context,
            };
        }
    };

    let gas_limit_signed = i64::try_from(gas_limit).unwrap_or(i64::MAX);
    let mut vm = Interpreter::new(image.program().clone(), host, context);
    vm.init_invocation(&image, args, entry_pc, gas_limit_signed);

    let exit = vm.run();
    let gas_used = exit.gas_consumed(gas_limit_signed as u64, vm.gas());

    let outcome = match exit.into_invocation_error() {
        None => {
            let address = vm.registers()[REG_A0] as u32;
            let len = vm.registers()[REG_A1] as usize;
            let blob = vm.memory().read(address, len).unwrap_or_default();
            Ok(blob)
        }
        Some(error) => Err(error),
    };

    tracing::debug!(?exit, gas_used, "invocation finished");

    InvocationResult {
        gas_used,
        outcome,
        context: vm.into_context(),
    }
}

/// Run one accumulate invocation.
///
/// Same machine behavior as [`invoke`], plus the context discipline of the
/// accumulate protocol: when the invocation panics or runs out of gas the
/// regular dimension of the implications pair is discarded in favor of the
/// exceptional checkpoint, so the caller never observes partial effects.
pub fn invoke_accumulate<E>(
    preimage: &[u8],
    entry_pc: u64,
    gas_limit: u64,
    args: &[u8],
    host: E,
    context: AccumulateContext,
) -> InvocationResult<AccumulateContext>
where
    E: HostHandler<AccumulateContext>,
{
    let mut result = invoke(preimage, entry_pc, gas_limit, args, host, context);
    if result.outcome.is_err() {
        result.context.implications.revert();
    }
    result
}

impl ExitReason {
    /// Gas accounting shared by the wrapper and by embedders running the
    /// loop directly: consumed gas is the limit minus the non-negative
    /// remainder, except on gas exhaustion where the whole limit is
    /// forfeited.
    pub fn gas_consumed(&self, gas_limit: u64, gas_left: i64) -> u64 {
        match self {
            Self::OutOfGas => gas_limit,
            _ => gas_limit.saturating_sub(gas_left.max(0) as u64),
        }
    }
}
