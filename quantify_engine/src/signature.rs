//! Method signature labels.

use quantify_bytecode::{DescriptorError, MethodUnit};

/// Build the human-identifiable label for a method: its name followed by the
/// parameter descriptors in declared order, concatenated with no separator,
/// wrapped in parentheses.
///
/// The label deliberately excludes the return type, so methods differing only
/// by return type share a label. It identifies events for humans; it is not
/// a unique key.
pub fn resolve_signature(method: &MethodUnit) -> Result<String, DescriptorError> {
    let descriptor = method.parsed_descriptor()?;
    let mut label = String::with_capacity(method.name.len() + method.descriptor.len());
    label.push_str(&method.name);
    label.push('(');
    for param in &descriptor.params {
        label.push_str(param);
    }
    label.push(')');
    Ok(label)
}
