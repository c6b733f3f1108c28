//! Data transfer: moving resolved values onto the stage about to run.
//!
//! For every input that wiring resolved and that carries no literal value,
//! the engine parses the address back, finds the producing slot among the
//! earlier slots, fetches the producer's current value for that member, and
//! assigns it onto the consumer's field. Opaque payloads are assigned by
//! shared handle, not copied: the consumer aliases the producer's object.
//!
//! Self-reference is impossible by construction — an address only ever
//! points at an earlier slot — so there is no runtime self-exclusion check.

use crate::errors::{PipelineError, Result};
use crate::stage::StageSlot;

/// Transfer every wired, literal-free input of `current` from its producer.
pub fn transfer_inputs(current: &mut StageSlot, history: &[StageSlot]) -> Result<()> {
    let consumer = current.label();
    for i in 0..current.inputs.len() {
        let (address, member_name) = {
            let input = &current.inputs[i];
            if input.has_value {
                continue;
            }
            match &input.member_pipe {
                Some(address) => (address.clone(), input.member_name.clone()),
                None => continue,
            }
        };

        let producer = history
            .iter()
            .find(|s| s.name == address.stage_name && s.id == address.stage_id)
            .ok_or_else(|| PipelineError::unresolved_stage(address.to_string(), &consumer))?;

        match producer.get_member(&address.member_name) {
            Some(value) => {
                log::debug!("{consumer}.{member_name} <- {address}");
                current.set_member(&member_name, value)?;
            }
            None => {
                // The producer was wired but never produced (e.g. disabled);
                // the input stays unset and the stage decides how to cope.
                log::debug!("{address} holds no value; {consumer}.{member_name} left unset");
            }
        }
    }
    Ok(())
}
