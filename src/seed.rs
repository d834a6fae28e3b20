use chrono::NaiveDate;
use log::info;

use crate::error::CatalogError;
use crate::models::{Game, Guide, TierList};
use crate::store::{Catalog, Seedable};

fn day(year: i32, month: u32, date: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, date).unwrap_or_default()
}

fn guide(id: i32, title: &str, author: &str, likes: i32, date: NaiveDate) -> Guide {
    Guide {
        id,
        title: title.to_string(),
        author: author.to_string(),
        content: String::new(),
        likes,
        date,
    }
}

fn tier_list(id: i32, title: &str, author: &str, votes: i32) -> TierList {
    TierList {
        id,
        title: title.to_string(),
        author: author.to_string(),
        content: String::new(),
        votes,
    }
}

#[allow(clippy::too_many_arguments)]
fn game(
    id: i32,
    name: &str,
    description: &str,
    category: &str,
    publisher: &str,
    release_year: i32,
    popularity: i32,
    guides: Vec<Guide>,
    tier_lists: Vec<TierList>,
) -> Game {
    Game {
        id,
        name: name.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        publisher: publisher.to_string(),
        release_year,
        popularity,
        guides,
        tier_lists,
    }
}

/// Static catalog used by the memory store and to seed empty external stores.
pub fn sample_games() -> Vec<Game> {
    vec![
        game(
            1,
            "Fortnite",
            "Battle royale game with building mechanics",
            "Battle Royale",
            "Epic Games",
            2017,
            90,
            vec![
                guide(101, "Building Tips for Beginners", "BuildMaster", 342, day(2023, 11, 12)),
                guide(102, "Advanced Weapon Loadouts", "WeaponExpert", 218, day(2023, 10, 5)),
                guide(103, "Season 9 Meta Analysis", "MetaGuru", 560, day(2024, 2, 20)),
            ],
            vec![
                tier_list(901, "Season 9 Weapon Tier List", "ProGamer123", 1250),
                tier_list(902, "Current Meta POI Rankings", "MapMaster", 850),
            ],
        ),
        game(
            2,
            "League of Legends",
            "Multiplayer online battle arena",
            "MOBA",
            "Riot Games",
            2009,
            95,
            vec![
                guide(201, "Jungle Pathing Guide", "JunglePro", 876, day(2023, 12, 15)),
                guide(202, "Ward Placement Strategy", "VisionMaster", 654, day(2024, 1, 10)),
                guide(203, "Support Role Macro Guide", "SupportLife", 432, day(2024, 3, 5)),
            ],
            vec![
                tier_list(801, "Champion Tier List Patch 14.5", "LeagueMaster", 3200),
                tier_list(802, "Best ADCs Current Meta", "ADCMain99", 1850),
            ],
        ),
        game(
            3,
            "Valorant",
            "Tactical shooter with unique agent abilities",
            "Tactical FPS",
            "Riot Games",
            2020,
            88,
            vec![
                guide(301, "Aim Training Routine", "HeadshotKing", 987, day(2023, 11, 28)),
                guide(302, "Agent Tier List", "TacticalGenius", 765, day(2024, 2, 15)),
                guide(303, "Economy Management Guide", "EconoMaster", 546, day(2024, 1, 20)),
            ],
            vec![
                tier_list(701, "Agent Tier List Episode 7", "ValMaster", 2800),
                tier_list(702, "Weapon Rankings by Map", "GunGuru", 1650),
            ],
        ),
        game(
            4,
            "Street Fighter 6",
            "Competitive fighting game with diverse character roster",
            "Fighting",
            "Capcom",
            2023,
            82,
            vec![
                guide(401, "Frame Data Explained", "FighterPhysics", 645, day(2023, 10, 18)),
                guide(402, "Basic Combo Guide", "ComboKing", 834, day(2023, 9, 25)),
                guide(403, "Advanced Mind Games", "MindMaster", 420, day(2024, 1, 5)),
            ],
            vec![
                tier_list(601, "Character Tier List Season 2", "FGCMaster", 1900),
                tier_list(602, "Move Tier List", "FrameData", 750),
            ],
        ),
        game(
            5,
            "Call of Duty",
            "First-person shooter series with modern military themes",
            "FPS",
            "Activision",
            2003,
            92,
            vec![
                guide(501, "Warzone Loadout Guide", "LoadoutKing", 1200, day(2024, 1, 10)),
                guide(502, "Movement Mechanics Tutorial", "MovementGod", 980, day(2023, 12, 20)),
                guide(503, "Map Callouts Guide", "MapMaster", 765, day(2024, 2, 18)),
            ],
            vec![
                tier_list(501, "Weapon Meta Tier List", "GunExpert", 4500),
                tier_list(502, "Best Perk Combinations", "PerkPro", 2300),
            ],
        ),
        game(
            6,
            "Warzone",
            "Free-to-play battle royale mode for Call of Duty",
            "Battle Royale",
            "Activision",
            2020,
            89,
            vec![
                guide(601, "Rebirth Island Drop Spots", "RebirthGod", 890, day(2024, 2, 5)),
                guide(602, "Best Controller Settings", "ControllerPro", 720, day(2023, 11, 30)),
                guide(603, "Long Range Meta", "SnipeMaster", 650, day(2024, 3, 10)),
            ],
            vec![
                tier_list(401, "Season 4 Weapon Tier List", "WarzonePro", 5600),
                tier_list(402, "Best Tactical Equipment", "TacGod", 2100),
            ],
        ),
        game(
            7,
            "Marvel Rivals",
            "Team-based hero shooter featuring Marvel characters",
            "Hero Shooter",
            "NetEase Games",
            2023,
            78,
            vec![
                guide(701, "Beginner Hero Picks", "MarvelMaster", 540, day(2023, 10, 15)),
                guide(702, "Team Composition Guide", "TeamTactician", 420, day(2024, 1, 25)),
                guide(703, "Map Objectives Breakdown", "ObjectivePro", 380, day(2024, 2, 28)),
            ],
            vec![
                tier_list(301, "Hero Power Rankings", "MarvelExpert", 1800),
                tier_list(302, "Team Comp Tier List", "StrategyMaster", 950),
            ],
        ),
    ]
}

/// Populates `store` with `games` unless it already holds any game.
/// Returns whether anything was written.
pub async fn seed_if_empty(store: &dyn Seedable, games: &[Game]) -> Result<bool, CatalogError> {
    if !store.is_empty().await? {
        info!("{} store already populated, skipping seed", store.kind());
        return Ok(false);
    }

    info!("{} store is empty, seeding {} games", store.kind(), games.len());
    for game in games {
        store.insert_game(game).await?;
        info!(
            "Seeded {} with {} guides and {} tier lists",
            game.name,
            game.guides.len(),
            game.tier_lists.len()
        );
    }

    Ok(true)
}
