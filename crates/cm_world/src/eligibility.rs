//! Command eligibility rules.
//!
//! A pure function of the selected unit, the selected territory, the clan
//! catalog and the player's clan. Nothing is cached between evaluations.

use crate::clan::ClanCatalog;
use crate::connectivity::Connectivity;
use crate::territory::Territory;
use crate::unit::Unit;
use cm_core::{ClanId, CommandKind, CommandSet};

/// Everything besides the unit and territory the rules look at.
pub struct EligibilityContext<'a, C: Connectivity + ?Sized> {
    pub clans: &'a ClanCatalog,
    /// Clan of the connected player, owner of the selected unit.
    pub player_clan: Option<ClanId>,
    pub connectivity: &'a C,
}

impl<'a, C: Connectivity + ?Sized> EligibilityContext<'a, C> {
    pub fn new(clans: &'a ClanCatalog, player_clan: Option<ClanId>, connectivity: &'a C) -> Self {
        Self {
            clans,
            player_clan,
            connectivity,
        }
    }
}

/// Compute the commands enabled for `unit` against `territory`.
///
/// A missing unit or territory yields the empty set.
pub fn eligible<C: Connectivity + ?Sized>(
    unit: Option<&Unit>,
    territory: Option<&Territory>,
    ctx: &EligibilityContext<'_, C>,
) -> CommandSet {
    let (Some(unit), Some(territory)) = (unit, territory) else {
        return CommandSet::empty();
    };

    let home = ctx.clans.home_of(ctx.player_clan);
    let here = unit.is_at(territory.id);
    let is_home = home == Some(territory.id);
    let deployed = unit.is_deployed();
    let camped = unit.is_camped();
    let governs = territory.is_controlled_by(ctx.player_clan);

    // Moves only run between the home base and a frontier land.
    let base_hop = home.is_some_and(|h| unit.current_territory == h || territory.id == h);
    let can_move = !here
        && !camped
        && !deployed
        && base_hop
        && ctx.connectivity.adjacent(unit.current_territory, territory.id);

    let mut set = CommandSet::empty();
    set.enable_if(CommandKind::Deploy, here && !is_home && !deployed);
    set.enable_if(CommandKind::Undeploy, here && deployed);
    set.enable_if(CommandKind::Move, can_move);
    set.enable_if(CommandKind::Heal, here && is_home);
    set.enable_if(CommandKind::Collect, here && governs);
    set.enable_if(CommandKind::Drop, here && governs);
    set.enable_if(CommandKind::Camp, here && governs && !camped);
    set.enable_if(CommandKind::Uncamp, here && governs && camped);
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clan::Clan;
    use crate::connectivity::{AdjacencyTable, Unrestricted};
    use cm_core::{TerritoryId, UnitId};

    const HOME: TerritoryId = TerritoryId(10);
    const FRONTIER: TerritoryId = TerritoryId(20);
    const OTHER: TerritoryId = TerritoryId(30);
    const MINE: ClanId = ClanId(1);
    const RIVAL: ClanId = ClanId(2);

    fn clans() -> ClanCatalog {
        ClanCatalog::new(vec![
            Clan::new(MINE, "Crimson", HOME),
            Clan::new(RIVAL, "Jade", OTHER),
        ])
    }

    fn land(id: TerritoryId, controller: Option<ClanId>) -> Territory {
        let mut t = Territory::new(id, "land");
        t.controlling_clan = controller;
        t
    }

    fn unit_at(id: TerritoryId) -> Unit {
        Unit::new(UnitId(1), "0xabc", id)
    }

    fn check(unit: &Unit, territory: &Territory) -> CommandSet {
        let clans = clans();
        let ctx = EligibilityContext::new(&clans, Some(MINE), &Unrestricted);
        eligible(Some(unit), Some(territory), &ctx)
    }

    fn set_of(kinds: &[CommandKind]) -> CommandSet {
        kinds.iter().copied().collect()
    }

    #[test]
    fn idle_unit_on_frontier_can_deploy() {
        let result = check(&unit_at(FRONTIER), &land(FRONTIER, Some(RIVAL)));
        assert_eq!(result, set_of(&[CommandKind::Deploy]));
    }

    #[test]
    fn idle_unit_on_held_frontier_can_deploy_and_work_the_land() {
        let result = check(&unit_at(FRONTIER), &land(FRONTIER, Some(MINE)));
        assert_eq!(
            result,
            set_of(&[CommandKind::Deploy, CommandKind::Collect, CommandKind::Drop, CommandKind::Camp])
        );
    }

    #[test]
    fn unit_at_home_can_heal() {
        let result = check(&unit_at(HOME), &land(HOME, None));
        assert_eq!(result, set_of(&[CommandKind::Heal]));
    }

    #[test]
    fn unit_at_governed_home_can_heal_and_collect() {
        let result = check(&unit_at(HOME), &land(HOME, Some(MINE)));
        assert_eq!(
            result,
            set_of(&[CommandKind::Heal, CommandKind::Collect, CommandKind::Drop, CommandKind::Camp])
        );
    }

    #[test]
    fn deployed_unit_can_only_undeploy() {
        let mut unit = unit_at(FRONTIER);
        unit.deployment_start_time = 1_700_000_000;
        let result = check(&unit, &land(FRONTIER, Some(RIVAL)));
        assert_eq!(result, set_of(&[CommandKind::Undeploy]));
    }

    #[test]
    fn camped_unit_can_uncamp_but_not_camp() {
        let mut unit = unit_at(FRONTIER);
        unit.camp_start_time = 1_700_000_000;
        let result = check(&unit, &land(FRONTIER, Some(MINE)));
        assert!(result.allows(CommandKind::Uncamp));
        assert!(!result.allows(CommandKind::Camp));
    }

    #[test]
    fn toggles_are_never_both_enabled() {
        for camp in [0, 5] {
            for deployment in [0, 7] {
                if camp != 0 && deployment != 0 {
                    continue;
                }
                for land_id in [HOME, FRONTIER, OTHER] {
                    for controller in [None, Some(MINE), Some(RIVAL)] {
                        let mut unit = unit_at(FRONTIER);
                        unit.camp_start_time = camp;
                        unit.deployment_start_time = deployment;
                        let result = check(&unit, &land(land_id, controller));
                        assert!(
                            !(result.allows(CommandKind::Deploy) && result.allows(CommandKind::Undeploy))
                        );
                        assert!(
                            !(result.allows(CommandKind::Camp) && result.allows(CommandKind::Uncamp))
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn move_from_home_to_frontier() {
        let result = check(&unit_at(HOME), &land(FRONTIER, None));
        assert_eq!(result, set_of(&[CommandKind::Move]));
    }

    #[test]
    fn move_from_frontier_back_home() {
        let result = check(&unit_at(FRONTIER), &land(HOME, None));
        assert_eq!(result, set_of(&[CommandKind::Move]));
    }

    #[test]
    fn no_frontier_to_frontier_moves() {
        let result = check(&unit_at(FRONTIER), &land(OTHER, None));
        assert!(result.is_empty());
    }

    #[test]
    fn camped_or_deployed_units_cannot_move() {
        let mut camped = unit_at(HOME);
        camped.camp_start_time = 3;
        assert!(!check(&camped, &land(FRONTIER, None)).allows(CommandKind::Move));

        let mut deployed = unit_at(FRONTIER);
        deployed.deployment_start_time = 3;
        assert!(!check(&deployed, &land(HOME, None)).allows(CommandKind::Move));
    }

    #[test]
    fn move_requires_adjacency() {
        let clans = clans();
        let table = AdjacencyTable::new(vec![(HOME, OTHER)]);
        let ctx = EligibilityContext::new(&clans, Some(MINE), &table);
        let unit = unit_at(HOME);
        assert!(!eligible(Some(&unit), Some(&land(FRONTIER, None)), &ctx).allows(CommandKind::Move));
        assert!(eligible(Some(&unit), Some(&land(OTHER, None)), &ctx).allows(CommandKind::Move));
    }

    #[test]
    fn unknown_player_clan() {
        let clans = clans();
        let ctx = EligibilityContext::new(&clans, None, &Unrestricted);
        let unit = unit_at(HOME);
        // Without a known home every land is a frontier and no move qualifies.
        assert_eq!(eligible(Some(&unit), Some(&land(HOME, None)), &ctx), set_of(&[CommandKind::Deploy]));
        assert!(eligible(Some(&unit), Some(&land(FRONTIER, None)), &ctx).is_empty());
    }

    #[test]
    fn missing_inputs_yield_nothing() {
        let clans = clans();
        let ctx = EligibilityContext::new(&clans, Some(MINE), &Unrestricted);
        let unit = unit_at(HOME);
        let territory = land(HOME, Some(MINE));
        assert!(eligible(None, Some(&territory), &ctx).is_empty());
        assert!(eligible(Some(&unit), None, &ctx).is_empty());
        assert!(eligible(None, None, &ctx).is_empty());
    }

    #[test]
    fn dyn_connectivity_is_accepted() {
        let clans = clans();
        let graph: &dyn Connectivity = &Unrestricted;
        let ctx = EligibilityContext::new(&clans, Some(MINE), graph);
        let unit = unit_at(HOME);
        assert!(eligible(Some(&unit), Some(&land(FRONTIER, None)), &ctx).allows(CommandKind::Move));
    }
}
