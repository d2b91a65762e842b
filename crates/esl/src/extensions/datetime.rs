// Datetime library, backed by chrono.
// Datetimes and durations are host objects: attribute reads work through
// the host bridge, construction and formatting through the module table.

use std::any::Any;
use std::rc::Rc;

use chrono::{Datelike, Duration, Local, NaiveDateTime, Timelike};

use crate::esl_error::{EslResult, EslRuntimeError};
use crate::esl_value::EslValue;
use crate::host::{HostObject, downcast_object};
use crate::lib_registry::ExtensionModule;

use super::{opt_int_arg, str_arg};

pub fn create_datetime_module() -> ExtensionModule {
    crate::ext_module!("datetime", {
        "now" => datetime_now,
        "parse" => datetime_parse,
        "strftime" => datetime_strftime,
        "add" => datetime_add,
        "timedelta" => datetime_timedelta,
    })
}

pub struct EslDateTime(pub NaiveDateTime);

impl HostObject for EslDateTime {
    fn type_name(&self) -> &str {
        "datetime"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn get_attr(&self, name: &str) -> EslResult<EslValue> {
        Ok(match name {
            "year" => EslValue::Int(self.0.year() as i64),
            "month" => EslValue::Int(self.0.month() as i64),
            "day" => EslValue::Int(self.0.day() as i64),
            "hour" => EslValue::Int(self.0.hour() as i64),
            "minute" => EslValue::Int(self.0.minute() as i64),
            "second" => EslValue::Int(self.0.second() as i64),
            _ => EslValue::Nil,
        })
    }

    fn has_attr(&self, name: &str) -> bool {
        matches!(
            name,
            "year" | "month" | "day" | "hour" | "minute" | "second"
        )
    }
}

pub struct EslDuration(pub Duration);

impl HostObject for EslDuration {
    fn type_name(&self) -> &str {
        "timedelta"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn get_attr(&self, name: &str) -> EslResult<EslValue> {
        Ok(match name {
            "days" => EslValue::Int(self.0.num_days()),
            "hours" => EslValue::Int(self.0.num_hours()),
            "minutes" => EslValue::Int(self.0.num_minutes()),
            "seconds" | "total_seconds" => EslValue::Int(self.0.num_seconds()),
            _ => EslValue::Nil,
        })
    }

    fn has_attr(&self, name: &str) -> bool {
        matches!(
            name,
            "days" | "hours" | "minutes" | "seconds" | "total_seconds"
        )
    }
}

fn datetime_now(_args: Vec<EslValue>) -> EslResult<EslValue> {
    Ok(EslValue::Object(Rc::new(EslDateTime(
        Local::now().naive_local(),
    ))))
}

/// datetime.parse(s, fmt) - strptime-style parsing.
fn datetime_parse(args: Vec<EslValue>) -> EslResult<EslValue> {
    let text = str_arg(&args, 0, "parse")?;
    let format = str_arg(&args, 1, "parse")?;

    let parsed = NaiveDateTime::parse_from_str(text, format).map_err(|err| {
        EslRuntimeError::value_error(format!("cannot parse `{}': {}", text, err))
    })?;
    Ok(EslValue::Object(Rc::new(EslDateTime(parsed))))
}

/// datetime.strftime(dt, fmt) - format a datetime value.
fn datetime_strftime(args: Vec<EslValue>) -> EslResult<EslValue> {
    let Some(dt) = args.first().and_then(|v| downcast_object::<EslDateTime>(v).map(|d| d.0))
    else {
        return Err(EslRuntimeError::type_error(
            "bad argument #1 to 'strftime' (datetime expected)",
        ));
    };
    let format = str_arg(&args, 1, "strftime")?;

    let mut out = String::new();
    use std::fmt::Write;
    write!(out, "{}", dt.format(format))
        .map_err(|_| EslRuntimeError::value_error(format!("bad format string `{}'", format)))?;
    Ok(EslValue::string(out))
}

/// datetime.add(dt, td) - shift a datetime by a duration.
fn datetime_add(args: Vec<EslValue>) -> EslResult<EslValue> {
    let Some(dt) = args.first().and_then(|v| downcast_object::<EslDateTime>(v).map(|d| d.0))
    else {
        return Err(EslRuntimeError::type_error(
            "bad argument #1 to 'add' (datetime expected)",
        ));
    };
    let Some(td) = args.get(1).and_then(|v| downcast_object::<EslDuration>(v).map(|d| d.0))
    else {
        return Err(EslRuntimeError::type_error(
            "bad argument #2 to 'add' (timedelta expected)",
        ));
    };

    let shifted = dt
        .checked_add_signed(td)
        .ok_or_else(|| EslRuntimeError::value_error("datetime out of range"))?;
    Ok(EslValue::Object(Rc::new(EslDateTime(shifted))))
}

/// datetime.timedelta(days?, hours?, minutes?, seconds?) - construct a
/// duration; all components default to zero.
fn datetime_timedelta(args: Vec<EslValue>) -> EslResult<EslValue> {
    let days = opt_int_arg(&args, 0, "timedelta", 0)?;
    let hours = opt_int_arg(&args, 1, "timedelta", 0)?;
    let minutes = opt_int_arg(&args, 2, "timedelta", 0)?;
    let seconds = opt_int_arg(&args, 3, "timedelta", 0)?;

    let duration = Duration::days(days)
        + Duration::hours(hours)
        + Duration::minutes(minutes)
        + Duration::seconds(seconds);
    Ok(EslValue::Object(Rc::new(EslDuration(duration))))
}
