// ============================================================================
// Liens sortants
// ============================================================================
// Ouvre une URL dans le navigateur du système (nouveau contexte de
// navigation). Best effort : l'erreur est retournée à l'appelant qui
// l'affiche et la journalise, sans jamais interrompre l'application.
// ============================================================================

use std::io;

use tracing::info;

/// Lance l'ouverture de `url` dans le navigateur, sans l'attendre
pub fn open_url(url: &str) -> io::Result<()> {
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, format!("refusing to open '{}'", url)));
    }

    // Processus détaché : le navigateur ne doit pas écrire dans le TUI
    open::that_detached(url)?;

    info!(%url, "External link opened");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_http_urls_are_refused() {
        let err = open_url("file:///etc/passwd").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
