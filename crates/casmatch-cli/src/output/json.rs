use casmatch_core::error::CasMatchError;
use serde::Serialize;

pub fn print<T: Serialize + ?Sized>(value: &T) -> Result<(), CasMatchError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
