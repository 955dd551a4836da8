//! Prompt and output schema for the solar audit.

use serde_json::{Value, json};
use solar_portal_core::EstimateRequest;

/// The consultant instruction with the request's four inputs filled in.
#[must_use]
pub fn build_prompt(request: &EstimateRequest) -> String {
    format!(
        "Agis en tant que consultant professionnel en énergie solaire et ingénierie électrique \
         pour \"AD Innovation Services Plus\". Calcule une estimation d'installation solaire \
         basée sur ces détails :\n\
         - Facture d'électricité mensuelle : {bill}$\n\
         - Type de toit : {roof}\n\
         - Localisation : {location}\n\
         - Exposition au soleil : {exposure}\n\n\
         Fournis une réponse d'ingénierie professionnelle exclusivement en français et au format JSON.",
        bill = request.monthly_bill,
        roof = request.roof_type.label(),
        location = request.location,
        exposure = request.sun_exposure.label(),
    )
}

/// Structured output schema: five required properties, all strings except
/// the panel count.
#[must_use]
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "potentialSavings": {
                "type": "STRING",
                "description": "Économies mensuelles estimées en dollars"
            },
            "recommendedPanels": {
                "type": "NUMBER",
                "description": "Nombre estimé de panneaux solaires nécessaires"
            },
            "environmentalImpact": {
                "type": "STRING",
                "description": "Équivalent réduction CO2"
            },
            "paybackPeriod": {
                "type": "STRING",
                "description": "Années estimées pour le retour sur investissement"
            },
            "advice": {
                "type": "STRING",
                "description": "Bref conseil professionnel pour cet utilisateur spécifique"
            }
        },
        "required": [
            "potentialSavings",
            "recommendedPanels",
            "environmentalImpact",
            "paybackPeriod",
            "advice"
        ]
    })
}
