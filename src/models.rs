pub mod catalog;
pub mod dashboard;
pub mod inventory;

use rust_decimal::Decimal;
use validator::ValidationError;

/// Casas decimais das colunas NUMERIC(18, 4) de quantidade e custo.
pub const DECIMAL_SCALE: u32 = 4;

/// `true` se o valor não cabe na escala do banco sem arredondamento.
pub fn exceeds_scale(val: Decimal) -> bool {
    val.normalize().scale() > DECIMAL_SCALE
}

fn scale_error() -> ValidationError {
    let mut err = ValidationError::new("scale");
    err.add_param("max_scale".into(), &DECIMAL_SCALE);
    err.message = Some("O valor aceita no máximo 4 casas decimais.".into());
    err
}

// ---
// Validações Customizadas (compartilhadas pelos payloads)
// ---
pub(crate) fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    if exceeds_scale(*val) {
        return Err(scale_error());
    }
    Ok(())
}

pub(crate) fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.add_param("exclusive_min".into(), &0.0);
        err.message = Some("O valor deve ser maior que zero.".into());
        return Err(err);
    }
    if exceeds_scale(*val) {
        return Err(scale_error());
    }
    Ok(())
}
