// ============================================================================
// Layout : Découpage de l'écran et zones cliquables
// ============================================================================
// Le même calcul sert au rendu et au hit-testing de la souris : une zone
// dessinée est exactement une zone cliquable.
//
// CONCEPT RATATUI : Layout
// - split() découpe un Rect en plusieurs zones
// - Constraints : Length(n), Min(n), Ratio(a, b)...
// ============================================================================

use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::models::NavSurface;
use crate::page::Router;

/// Largeur du tiroir latéral
pub const DRAWER_WIDTH: u16 = 28;

/// Zones de l'écran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLayout {
    /// Marque, fragment, statistiques en direct
    pub header: Rect,

    /// Barre de navigation du haut
    pub top_nav: Rect,

    /// Page empilée (viewport)
    pub body: Rect,

    /// Dock du bas (avec bordures)
    pub dock: Rect,

    /// Raccourcis ou message transitoire
    pub footer: Rect,

    /// Tiroir latéral, par-dessus le corps
    pub drawer: Option<Rect>,
}

/// Calcule le layout principal
pub fn page_layout(area: Rect, drawer_open: bool) -> PageLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Length(1), // Top nav
            Constraint::Min(0),    // Page
            Constraint::Length(3), // Dock
            Constraint::Length(1), // Footer
        ])
        .split(area);

    let body = chunks[2];
    let drawer = drawer_open.then(|| Rect {
        x: body.x,
        y: body.y,
        width: DRAWER_WIDTH.min(body.width),
        height: body.height,
    });

    PageLayout {
        header: chunks[0],
        top_nav: chunks[1],
        body,
        dock: chunks[3],
        footer: chunks[4],
        drawer,
    }
}

/// Découpe une barre en `count` cellules de même largeur
pub fn nav_cells(area: Rect, count: usize) -> Vec<Rect> {
    if count == 0 {
        return Vec::new();
    }
    let constraints = vec![Constraint::Ratio(1, count as u32); count];
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area)
        .to_vec()
}

/// Intérieur d'un bloc à bordures
pub fn inner(area: Rect) -> Rect {
    Rect {
        x: area.x.saturating_add(1),
        y: area.y.saturating_add(1),
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    }
}

/// Ligne du tiroir occupée par son n-ième lien
pub fn drawer_rows(drawer: Rect, count: usize) -> Vec<Rect> {
    let area = inner(drawer);
    (0..count)
        .take(area.height as usize)
        .map(|i| Rect {
            x: area.x,
            y: area.y + i as u16,
            width: area.width,
            height: 1,
        })
        .collect()
}

/// Résultat d'un clic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// Affordance (index global dans le Router)
    Affordance(usize),

    /// Clic hors du tiroir ouvert
    OutsideDrawer,

    Nothing,
}

/// Vérifie si un point (x, y) est dans un Rect
pub fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

/// Identifie ce qui se trouve sous la souris
pub fn hit_test(layout: &PageLayout, router: &Router, x: u16, y: u16) -> Hit {
    // Tiroir ouvert : il capture tous les clics
    if let Some(drawer) = layout.drawer {
        if !point_in_rect(x, y, drawer) {
            return Hit::OutsideDrawer;
        }
        let links: Vec<usize> = router.affordances_on(NavSurface::Sidebar).map(|(i, _)| i).collect();
        return drawer_rows(drawer, links.len())
            .into_iter()
            .zip(links)
            .find(|(rect, _)| point_in_rect(x, y, *rect))
            .map(|(_, index)| Hit::Affordance(index))
            .unwrap_or(Hit::Nothing);
    }

    let bars = [
        (NavSurface::TopNav, layout.top_nav),
        (NavSurface::Dock, inner(layout.dock)),
    ];
    for (surface, bar) in bars {
        let items: Vec<usize> = router.affordances_on(surface).map(|(i, _)| i).collect();
        let hit = nav_cells(bar, items.len())
            .into_iter()
            .zip(items)
            .find(|(rect, _)| point_in_rect(x, y, *rect));
        if let Some((_, index)) = hit {
            return Hit::Affordance(index);
        }
    }

    Hit::Nothing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageConfig;

    fn screen() -> Rect {
        Rect::new(0, 0, 100, 30)
    }

    #[test]
    fn test_layout_heights() {
        let layout = page_layout(screen(), false);
        assert_eq!(layout.header.height, 1);
        assert_eq!(layout.top_nav.y, 1);
        assert_eq!(layout.body.height, 24);
        assert_eq!(layout.dock.height, 3);
        assert_eq!(layout.footer.y, 29);
        assert!(layout.drawer.is_none());
    }

    #[test]
    fn test_nav_cells_cover_the_bar() {
        let cells = nav_cells(Rect::new(0, 1, 100, 1), 4);
        assert_eq!(cells.len(), 4);
        assert_eq!(cells[0].x, 0);
        assert_eq!(cells.iter().map(|c| c.width).sum::<u16>(), 100);
        assert!(nav_cells(Rect::new(0, 1, 100, 1), 0).is_empty());
    }

    #[test]
    fn test_click_on_dock_item() {
        let router = PageConfig::default().build_router().unwrap();
        let layout = page_layout(screen(), false);

        // Dock : 5 items sur 98 colonnes intérieures, ligne 27
        let dock_y = layout.dock.y + 1;
        match hit_test(&layout, &router, 90, dock_y) {
            Hit::Affordance(index) => {
                let item = &router.affordances()[index];
                assert_eq!(item.surface, NavSurface::Dock);
                assert_eq!(item.section.as_str(), "community");
            }
            other => panic!("unexpected hit: {:?}", other),
        }
    }

    #[test]
    fn test_click_on_top_nav_item() {
        let router = PageConfig::default().build_router().unwrap();
        let layout = page_layout(screen(), false);

        match hit_test(&layout, &router, 30, layout.top_nav.y) {
            Hit::Affordance(index) => {
                let item = &router.affordances()[index];
                assert_eq!(item.surface, NavSurface::TopNav);
                assert_eq!(item.section.as_str(), "tokenomics");
            }
            other => panic!("unexpected hit: {:?}", other),
        }
    }

    #[test]
    fn test_drawer_captures_clicks() {
        let router = PageConfig::default().build_router().unwrap();
        let layout = page_layout(screen(), true);
        let drawer = layout.drawer.unwrap();

        assert_eq!(hit_test(&layout, &router, 80, 10), Hit::OutsideDrawer);

        match hit_test(&layout, &router, drawer.x + 2, drawer.y + 1) {
            Hit::Affordance(index) => {
                assert_eq!(router.affordances()[index].surface, NavSurface::Sidebar);
            }
            other => panic!("unexpected hit: {:?}", other),
        }

        // Bordure du tiroir
        assert_eq!(hit_test(&layout, &router, drawer.x, drawer.y), Hit::Nothing);
    }
}
