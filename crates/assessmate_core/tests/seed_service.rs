use assessmate_core::db::open_db_in_memory;
use assessmate_core::model::assessment::ModelValidationError;
use assessmate_core::{
    EntityCounts, EntityKind, Level, LevelPreset, RepoError, RosterGenerator, SeedConfig,
    SeedError, SeedProgress, SeedRepository, SeedService, Semester, SizeRange,
    SqliteSeedRepository,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rusqlite::Connection;

fn small_config(seed: u64) -> SeedConfig {
    let preset = LevelPreset {
        courses_target: 6,
        student_range: SizeRange::new(9, 14).unwrap(),
        team_size_range: SizeRange::new(3, 5).unwrap(),
    };
    SeedConfig::with_preset(Level::One, preset, Semester::Fall, 2026, seed).unwrap()
}

fn seed(conn: &mut Connection, config: &SeedConfig, purge: bool) -> Result<EntityCounts, SeedError> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    SeedService::new(conn)
        .run(config, purge, &mut rng, |_| {})
        .map(|report| report.totals)
}

fn counts(conn: &mut Connection) -> EntityCounts {
    SeedService::new(conn).counts().unwrap()
}

fn query_i64(conn: &Connection, sql: &str) -> i64 {
    conn.query_row(sql, [], |row| row.get(0)).unwrap()
}

#[test]
fn level_one_run_creates_expected_volumes() {
    let mut conn = open_db_in_memory().unwrap();
    let config = SeedConfig::new(Level::One, Semester::Spring, 2026, 7).unwrap();

    let totals = seed(&mut conn, &config, true).unwrap();

    assert_eq!(totals.courses, 150);
    assert_eq!(totals.assessments, 150);
    assert_eq!(totals.assessment_questions, 150 * 5);
    assert!(totals.course_members >= 150 * 30 && totals.course_members <= 150 * 80);
    assert_eq!(totals.users, 150 + totals.course_members);
    assert_eq!(totals.team_members, totals.course_members);
    assert_eq!(
        query_i64(&conn, "SELECT COUNT(*) FROM courses WHERE semester = 'Spring' AND year = 2026;"),
        150
    );
}

#[test]
fn every_student_lands_in_exactly_one_bounded_team() {
    let mut conn = open_db_in_memory().unwrap();
    let config = small_config(11);
    seed(&mut conn, &config, false).unwrap();

    assert_eq!(
        query_i64(
            &conn,
            "SELECT COUNT(*) FROM course_members cm
             LEFT JOIN team_members tm ON tm.course_member_id = cm.id
             WHERE tm.id IS NULL;"
        ),
        0
    );
    assert!(query_i64(&conn, "SELECT MIN(k) FROM (SELECT COUNT(*) AS k FROM team_members GROUP BY team_id);") >= 3);
    assert!(query_i64(&conn, "SELECT MAX(k) FROM (SELECT COUNT(*) AS k FROM team_members GROUP BY team_id);") <= 5);
}

#[test]
fn responses_cover_every_ordered_teammate_pair() {
    let mut conn = open_db_in_memory().unwrap();
    let config = small_config(5);
    let totals = seed(&mut conn, &config, false).unwrap();

    let expected = query_i64(
        &conn,
        "SELECT SUM(k * (k - 1)) FROM (SELECT COUNT(*) AS k FROM team_members GROUP BY team_id);",
    );
    assert_eq!(totals.assessment_responses as i64, expected);

    let teammates = query_i64(
        &conn,
        "SELECT COUNT(*) FROM assessment_responses r
         INNER JOIN course_members cf ON cf.user_id = r.from_user_id
         INNER JOIN team_members tf ON tf.course_member_id = cf.id
         INNER JOIN course_members ct ON ct.user_id = r.to_user_id
         INNER JOIN team_members tt ON tt.course_member_id = ct.id
         WHERE tf.team_id = tt.team_id AND r.submitted = 1;",
    );
    assert_eq!(teammates, expected);

    assert_eq!(
        query_i64(&conn, "SELECT COUNT(*) FROM assessment_responses WHERE from_user_id = to_user_id;"),
        0
    );
    assert_eq!(
        query_i64(
            &conn,
            "SELECT COUNT(*) FROM assessment_responses r, json_each(r.answers) j
             WHERE j.value < 1 OR j.value > 5;"
        ),
        0
    );
    assert_eq!(
        query_i64(&conn, "SELECT COUNT(*) FROM assessment_responses r, json_each(r.answers) j;"),
        expected * 5
    );
}

#[test]
fn same_seed_produces_identical_rows() {
    let mut first = open_db_in_memory().unwrap();
    let mut second = open_db_in_memory().unwrap();
    let config = small_config(42);

    seed(&mut first, &config, false).unwrap();
    seed(&mut second, &config, false).unwrap();

    let dump = |conn: &Connection| -> Vec<(String, String, String)> {
        let mut stmt = conn
            .prepare(
                "SELECT id, from_user_id, answers FROM assessment_responses ORDER BY rowid;",
            )
            .unwrap();
        stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    };
    assert_eq!(dump(&first), dump(&second));
    assert_eq!(counts(&mut first), counts(&mut second));
}

#[test]
fn reseeding_without_purge_fails_and_keeps_previous_rows() {
    let mut conn = open_db_in_memory().unwrap();
    let config = small_config(3);
    let before = seed(&mut conn, &config, false).unwrap();

    let err = seed(&mut conn, &config, false).unwrap_err();
    assert!(matches!(err, SeedError::Repo(_)));
    assert_eq!(counts(&mut conn), before);
}

#[test]
fn purge_then_reseed_replaces_previous_rows() {
    let mut conn = open_db_in_memory().unwrap();
    let config = small_config(3);
    let before = seed(&mut conn, &config, false).unwrap();

    let mut rng = StdRng::seed_from_u64(config.seed);
    let report = SeedService::new(&mut conn)
        .run(&config, true, &mut rng, |_| {})
        .unwrap();

    assert_eq!(report.purged, Some(before));
    assert_eq!(report.inserted, before);
    assert_eq!(report.totals, before);
}

#[test]
fn purge_empties_every_table() {
    let mut conn = open_db_in_memory().unwrap();
    seed(&mut conn, &small_config(9), false).unwrap();

    let removed = SeedService::new(&mut conn).purge().unwrap();
    assert!(removed.total() > 0);

    let after = counts(&mut conn);
    for kind in EntityKind::ALL {
        assert_eq!(after.get(kind), 0, "{} not empty", kind.table_name());
    }
}

#[test]
fn invalid_config_writes_nothing() {
    let mut conn = open_db_in_memory().unwrap();
    let mut config = small_config(1);
    config.max_score = 0;

    let err = seed(&mut conn, &config, false).unwrap_err();
    assert!(matches!(err, SeedError::Config(_)));
    assert_eq!(counts(&mut conn).total(), 0);
}

#[test]
fn progress_reaches_the_course_target() {
    let mut conn = open_db_in_memory().unwrap();
    let config = small_config(2);
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut ticks: Vec<SeedProgress> = Vec::new();

    SeedService::new(&mut conn)
        .run(&config, false, &mut rng, |progress| ticks.push(progress))
        .unwrap();

    assert_eq!(ticks.len(), 6);
    let last = ticks.last().unwrap();
    assert_eq!(last.completed, 6);
    assert_eq!(last.percent(), 100);
    assert!(ticks.windows(2).all(|pair| pair[0].completed < pair[1].completed));
}

#[test]
fn scores_above_scale_are_rejected_before_insert() {
    let conn = open_db_in_memory().unwrap();
    let config = small_config(8);
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut bundle = RosterGenerator::new(&config).generate_course(0, &mut rng);
    let response = bundle.responses.first_mut().unwrap();
    for score in response.answers.values_mut() {
        *score = config.max_score + 1;
    }

    let err = SqliteSeedRepository::new(&conn)
        .insert_course_bundle(&bundle)
        .unwrap_err();

    assert!(matches!(
        err,
        RepoError::Validation(ModelValidationError::ScoreOutOfRange { .. })
    ));
    assert_eq!(
        SqliteSeedRepository::new(&conn).count_entities().unwrap().total(),
        0
    );
}
