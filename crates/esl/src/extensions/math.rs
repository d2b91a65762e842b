// Math library
// The dialect is integer-only, so `round` is identity on well-formed
// input and exists for source compatibility.

use crate::esl_error::EslResult;
use crate::esl_value::EslValue;
use crate::lib_registry::ExtensionModule;

use super::int_arg;

pub fn create_math_module() -> ExtensionModule {
    crate::ext_module!("math", {
        "round" => math_round,
        "abs" => math_abs,
        "max" => math_max,
        "min" => math_min,
    })
}

fn math_round(args: Vec<EslValue>) -> EslResult<EslValue> {
    Ok(EslValue::Int(int_arg(&args, 0, "round")?))
}

fn math_abs(args: Vec<EslValue>) -> EslResult<EslValue> {
    let n = int_arg(&args, 0, "abs")?;
    Ok(EslValue::Int(n.saturating_abs()))
}

fn math_max(args: Vec<EslValue>) -> EslResult<EslValue> {
    let a = int_arg(&args, 0, "max")?;
    let b = int_arg(&args, 1, "max")?;
    Ok(EslValue::Int(a.max(b)))
}

fn math_min(args: Vec<EslValue>) -> EslResult<EslValue> {
    let a = int_arg(&args, 0, "min")?;
    let b = int_arg(&args, 1, "min")?;
    Ok(EslValue::Int(a.min(b)))
}
