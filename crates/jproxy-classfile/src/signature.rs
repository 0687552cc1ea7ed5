//! Minimal generic-signature support (JVMS §4.7.9.1).
//!
//! The planner only needs the generic arity of a class, so this module counts formal type
//! parameters instead of building a full signature tree.

use crate::error::{Error, Result};

/// Number of formal type parameters declared by a class `Signature` attribute.
///
/// `<K:Ljava/lang/Object;V:Ljava/lang/Object;>Ljava/lang/Object;` has arity 2.
pub fn type_parameter_count(signature: &str) -> Result<u8> {
    let Some(mut rest) = signature.strip_prefix('<') else {
        return Ok(0);
    };
    let invalid = || Error::InvalidSignature(signature.to_string());

    let mut count: u8 = 0;
    loop {
        if let Some(after) = rest.strip_prefix('>') {
            if count == 0 {
                return Err(invalid());
            }
            // The superclass signature must follow.
            return if after.is_empty() {
                Err(invalid())
            } else {
                Ok(count)
            };
        }

        let colon = rest.find(':').ok_or_else(invalid)?;
        if colon == 0 {
            return Err(invalid());
        }
        rest = &rest[colon..];
        count = count.checked_add(1).ok_or_else(invalid)?;

        // Class bound (may be empty), then any number of interface bounds.
        while let Some(after) = rest.strip_prefix(':') {
            rest = if after.starts_with(':') || after.starts_with('>') {
                after
            } else if after.starts_with(['L', 'T', '[']) {
                skip_reference_type(after).ok_or_else(invalid)?
            } else {
                // Next type parameter begins after an empty class bound.
                after
            };
            if !rest.starts_with(':') {
                break;
            }
        }
    }
}

fn skip_reference_type(input: &str) -> Option<&str> {
    match input.as_bytes().first()? {
        b'L' => skip_class_type(&input[1..]),
        b'T' => {
            let end = input.find(';')?;
            Some(&input[end + 1..])
        }
        b'[' => skip_type(&input[1..]),
        _ => None,
    }
}

fn skip_type(input: &str) -> Option<&str> {
    match input.as_bytes().first()? {
        b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' => Some(&input[1..]),
        _ => skip_reference_type(input),
    }
}

fn skip_class_type(mut input: &str) -> Option<&str> {
    loop {
        let idx = input.find([';', '<'])?;
        let tail = &input[idx..];
        if let Some(after) = tail.strip_prefix(';') {
            return Some(after);
        }
        // Type arguments.
        let mut args = &tail[1..];
        loop {
            match args.as_bytes().first()? {
                b'>' => {
                    args = &args[1..];
                    break;
                }
                b'*' => args = &args[1..],
                b'+' | b'-' => args = skip_reference_type(&args[1..])?,
                _ => args = skip_reference_type(args)?,
            }
        }
        // Either `;` or an inner-class suffix `.Inner...;`.
        input = args;
    }
}
