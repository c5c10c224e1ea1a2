// ============================================================================
// Viewport : la page empilée et sa fenêtre visible
// ============================================================================
// Les sections sont empilées de haut en bas. Le viewport est la fenêtre de
// `height` lignes qui commence à `offset`.
//
// CONCEPTS :
// 1. Smooth scroll : animation pas à pas (ease-out) avancée à chaque frame
// 2. Fraction visible : recouvrement section/fenêtre, comme un
//    IntersectionObserver
// ============================================================================

/// Part de la distance restante parcourue à chaque frame d'animation
const EASE_FACTOR: f64 = 0.35;

/// Fenêtre visible sur la page empilée
#[derive(Debug, Clone)]
pub struct Viewport {
    /// (début, hauteur) de chaque section, en lignes
    spans: Vec<(u32, u32)>,

    /// Première ligne visible
    offset: u32,

    /// Nombre de lignes visibles
    height: u32,

    /// Cible d'un smooth scroll en cours
    target: Option<u32>,
}

impl Viewport {
    /// Construit le viewport à partir des hauteurs de sections
    pub fn new(heights: impl IntoIterator<Item = u16>) -> Self {
        let mut spans = Vec::new();
        let mut top = 0u32;
        for h in heights {
            let h = u32::from(h.max(1));
            spans.push((top, h));
            top += h;
        }

        Self {
            spans,
            offset: 0,
            height: 0,
            target: None,
        }
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Hauteur totale de la page
    pub fn total_height(&self) -> u32 {
        self.spans.last().map(|(top, h)| top + h).unwrap_or(0)
    }

    fn max_offset(&self) -> u32 {
        self.total_height().saturating_sub(self.height)
    }

    /// Ligne de début d'une section (None si index inconnu)
    pub fn top_of(&self, index: usize) -> Option<u32> {
        self.spans.get(index).map(|(top, _)| *top)
    }

    /// Redimensionne la fenêtre (resize du terminal)
    pub fn set_height(&mut self, height: u16) {
        self.height = u32::from(height);
        self.offset = self.offset.min(self.max_offset());
        if let Some(target) = self.target {
            self.target = Some(target.min(self.max_offset()));
        }
    }

    /// Défilement utilisateur : annule un smooth scroll en cours
    ///
    /// Retourne true si l'offset a changé
    pub fn scroll_by(&mut self, delta: i32) -> bool {
        self.target = None;
        let before = self.offset;
        let next = i64::from(self.offset) + i64::from(delta);
        self.offset = next.clamp(0, i64::from(self.max_offset())) as u32;
        self.offset != before
    }

    /// Positionne directement la fenêtre sur une section (pas d'animation)
    pub fn jump_to(&mut self, index: usize) {
        if let Some(top) = self.top_of(index) {
            self.target = None;
            self.offset = top.min(self.max_offset());
        }
    }

    /// Démarre un smooth scroll vers le haut d'une section
    pub fn scroll_to(&mut self, index: usize) {
        if let Some(top) = self.top_of(index) {
            let target = top.min(self.max_offset());
            self.target = if target == self.offset { None } else { Some(target) };
        }
    }

    pub fn is_animating(&self) -> bool {
        self.target.is_some()
    }

    /// Avance l'animation d'une frame
    ///
    /// Retourne true si l'animation est toujours en cours après ce pas
    pub fn advance(&mut self) -> bool {
        let Some(target) = self.target else {
            return false;
        };

        let distance = i64::from(target) - i64::from(self.offset);
        // Au moins une ligne par frame pour terminer l'animation
        let step = ((distance.abs() as f64 * EASE_FACTOR).ceil() as i64).max(1);
        let next = if distance > 0 {
            i64::from(self.offset) + step.min(distance)
        } else {
            i64::from(self.offset) - step.min(-distance)
        };
        self.offset = next as u32;

        if self.offset == target {
            self.target = None;
        }
        self.target.is_some()
    }

    /// Fraction visible d'une section, dans [0, 1]
    ///
    /// Le dénominateur est min(hauteur de section, hauteur de fenêtre) :
    /// une section plus haute que la fenêtre peut quand même être "visible"
    pub fn visible_fraction(&self, index: usize) -> f64 {
        let Some(&(top, h)) = self.spans.get(index) else {
            return 0.0;
        };
        if self.height == 0 {
            return 0.0;
        }

        let start = top.max(self.offset);
        let end = (top + h).min(self.offset + self.height);
        let overlap = end.saturating_sub(start);

        f64::from(overlap) / f64::from(h.min(self.height))
    }

    /// Fractions visibles de toutes les sections
    pub fn fractions(&self) -> Vec<f64> {
        (0..self.spans.len()).map(|i| self.visible_fraction(i)).collect()
    }
}
