//! English/French rendering of every caller-facing status and error string.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Fr,
}

impl Locale {
    /// Pick a locale from an `Accept-Language` header value.
    ///
    /// Only the first language range is considered; anything other than French
    /// falls back to English.
    pub fn from_accept_language(header: &str) -> Self {
        let primary = header
            .split(',')
            .next()
            .and_then(|range| range.split(';').next())
            .map(|tag| tag.trim().to_ascii_lowercase())
            .unwrap_or_default();

        if primary == "fr" || primary.starts_with("fr-") {
            Locale::Fr
        } else {
            Locale::En
        }
    }
}

/// Every string that can reach a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    AccountClosed,
    OrganizationArchived { acronym: String },
    DomainRemoved { domain: String, acronym: String },

    CloseAccountForbidden,
    CloseAccountUnknownUser,
    ArchiveUnknownOrganization,
    ArchiveForbidden,
    RemoveDomainUnknownDomain,
    RemoveDomainUnknownOrganization,
    RemoveDomainNotClaimed,
    RemoveDomainForbidden,
    InvalidTarget,
    LastSuperAdmin,

    CloseAccountFailed,
    ArchiveOrganizationFailed,
    RemoveDomainFailed,
}

impl Message {
    pub fn render(&self, locale: Locale) -> String {
        match (self, locale) {
            (Message::AccountClosed, Locale::En) => "Successfully closed account.".to_string(),
            (Message::AccountClosed, Locale::Fr) => {
                "Le compte a été fermé avec succès.".to_string()
            }
            (Message::OrganizationArchived { acronym }, Locale::En) => {
                format!("Successfully archived organization: {}.", acronym)
            }
            (Message::OrganizationArchived { acronym }, Locale::Fr) => {
                format!("Organisation archivée avec succès : {}.", acronym)
            }
            (Message::DomainRemoved { domain, acronym }, Locale::En) => {
                format!("Successfully removed domain: {} from {}.", domain, acronym)
            }
            (Message::DomainRemoved { domain, acronym }, Locale::Fr) => {
                format!("Le domaine {} a été supprimé avec succès de {}.", domain, acronym)
            }

            (Message::CloseAccountForbidden, Locale::En) => {
                "Permission error: Unable to close other user's account.".to_string()
            }
            (Message::CloseAccountForbidden, Locale::Fr) => {
                "Erreur de permission : Impossible de fermer le compte d'un autre utilisateur."
                    .to_string()
            }
            (Message::CloseAccountUnknownUser, Locale::En) => {
                "Unable to close account of an undefined user.".to_string()
            }
            (Message::CloseAccountUnknownUser, Locale::Fr) => {
                "Impossible de fermer le compte d'un utilisateur non défini.".to_string()
            }
            (Message::ArchiveUnknownOrganization, Locale::En) => {
                "Unable to archive unknown organization.".to_string()
            }
            (Message::ArchiveUnknownOrganization, Locale::Fr) => {
                "Impossible d'archiver une organisation inconnue.".to_string()
            }
            (Message::ArchiveForbidden, Locale::En) => {
                "Permission Denied: Please contact super admin for help with archiving organization."
                    .to_string()
            }
            (Message::ArchiveForbidden, Locale::Fr) => {
                "Permission refusée : Veuillez contacter le super administrateur pour obtenir de l'aide sur l'archivage de l'organisation."
                    .to_string()
            }
            (Message::RemoveDomainUnknownDomain, Locale::En) => {
                "Unable to remove unknown domain.".to_string()
            }
            (Message::RemoveDomainUnknownDomain, Locale::Fr) => {
                "Impossible de supprimer un domaine inconnu.".to_string()
            }
            (Message::RemoveDomainUnknownOrganization, Locale::En) => {
                "Unable to remove domain from unknown organization.".to_string()
            }
            (Message::RemoveDomainUnknownOrganization, Locale::Fr) => {
                "Impossible de supprimer le domaine d'une organisation inconnue.".to_string()
            }
            (Message::RemoveDomainNotClaimed, Locale::En) => {
                "Unable to remove domain that does not belong to the given organization."
                    .to_string()
            }
            (Message::RemoveDomainNotClaimed, Locale::Fr) => {
                "Impossible de supprimer un domaine qui n'appartient pas à l'organisation donnée."
                    .to_string()
            }
            (Message::RemoveDomainForbidden, Locale::En) => {
                "Permission Denied: Please contact organization admin for help with removing domain."
                    .to_string()
            }
            (Message::RemoveDomainForbidden, Locale::Fr) => {
                "Permission refusée : Veuillez contacter l'administrateur de l'organisation pour obtenir de l'aide sur la suppression du domaine."
                    .to_string()
            }
            (Message::InvalidTarget, Locale::En) => "Unable to decode the supplied id.".to_string(),
            (Message::InvalidTarget, Locale::Fr) => {
                "Impossible de décoder l'identifiant fourni.".to_string()
            }
            (Message::LastSuperAdmin, Locale::En) => {
                "Unable to remove the last super admin affiliation.".to_string()
            }
            (Message::LastSuperAdmin, Locale::Fr) => {
                "Impossible de supprimer la dernière affiliation de super administrateur."
                    .to_string()
            }

            (Message::CloseAccountFailed, Locale::En) => {
                "Unable to close account. Please try again.".to_string()
            }
            (Message::CloseAccountFailed, Locale::Fr) => {
                "Impossible de fermer le compte. Veuillez réessayer.".to_string()
            }
            (Message::ArchiveOrganizationFailed, Locale::En) => {
                "Unable to archive organization. Please try again.".to_string()
            }
            (Message::ArchiveOrganizationFailed, Locale::Fr) => {
                "Impossible d'archiver l'organisation. Veuillez réessayer.".to_string()
            }
            (Message::RemoveDomainFailed, Locale::En) => {
                "Unable to remove domain. Please try again.".to_string()
            }
            (Message::RemoveDomainFailed, Locale::Fr) => {
                "Impossible de supprimer le domaine. Veuillez réessayer.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accept_language_prefers_first_range() {
        assert_eq!(Locale::from_accept_language("fr-CA,fr;q=0.9,en;q=0.8"), Locale::Fr);
        assert_eq!(Locale::from_accept_language("en-CA,fr;q=0.9"), Locale::En);
        assert_eq!(Locale::from_accept_language("FR"), Locale::Fr);
        assert_eq!(Locale::from_accept_language(""), Locale::En);
        assert_eq!(Locale::from_accept_language("frisian"), Locale::En);
    }

    #[test]
    fn messages_interpolate_names() {
        let msg = Message::OrganizationArchived {
            acronym: "TBS".to_string(),
        };
        assert_eq!(msg.render(Locale::En), "Successfully archived organization: TBS.");
        assert_eq!(msg.render(Locale::Fr), "Organisation archivée avec succès : TBS.");
    }

    #[test]
    fn generic_failures_ask_to_retry() {
        for msg in [
            Message::CloseAccountFailed,
            Message::ArchiveOrganizationFailed,
            Message::RemoveDomainFailed,
        ] {
            assert!(msg.render(Locale::En).ends_with("Please try again."));
            assert!(msg.render(Locale::Fr).ends_with("Veuillez réessayer."));
        }
    }
}
