use chrono::{Duration, Local, NaiveDate, Utc};

use stride::analytics::{RecordKind, TrendDirection};
use stride::db::models::{NewExercise, NewExerciseSet, NewWorkout};
use stride::domain::GoalType;
use stride::tracker::LoggedSet;
use stride::{StoreConfig, Tracker, TrackerError};

async fn tracker() -> Tracker {
    Tracker::open(&StoreConfig::in_memory()).await.unwrap()
}

fn set(weight: f64, reps: i64) -> NewExerciseSet {
    NewExerciseSet {
        weight,
        reps,
        ..Default::default()
    }
}

fn tracker_error(e: &anyhow::Error) -> Option<&TrackerError> {
    e.downcast_ref::<TrackerError>()
}

async fn record_on(tracker: &Tracker, date: NaiveDate) -> i64 {
    let started_at = date.and_hms_opt(18, 0, 0).unwrap().and_utc().timestamp();
    tracker
        .record_workout(&NewWorkout {
            name: format!("Workout {date}"),
            date,
            started_at,
            ended_at: Some(started_at + 3600),
            notes: None,
            template_id: None,
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn logging_numbers_sets_and_tracks_volume() {
    let tracker = tracker().await;
    let workout = tracker.start_workout(Some("Pull day")).await.unwrap();

    let logged = tracker
        .log_sets_by_name("deadlift", &set(100.0, 5), 3)
        .await
        .unwrap();
    let numbers: Vec<i64> = logged.sets.iter().map(|s| s.set_number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert!(logged.new_records.is_empty());

    let more = tracker
        .log_sets_by_name("Deadlift", &set(120.0, 3), 1)
        .await
        .unwrap();
    assert_eq!(more.sets[0].set_number, 4);
    assert!(more.new_records.contains(&RecordKind::MaxWeight));
    assert!(!more.new_records.contains(&RecordKind::MaxReps));

    let warmup = NewExerciseSet {
        is_warmup: true,
        ..set(200.0, 1)
    };
    let logged = tracker.log_sets_by_name("Deadlift", &warmup, 1).await.unwrap();
    assert!(logged.new_records.is_empty());

    let heavier = tracker
        .log_sets_by_name("Deadlift", &set(130.0, 3), 3)
        .await
        .unwrap();
    assert_eq!(heavier.sets.len(), 3);
    assert!(heavier.new_records.contains(&RecordKind::MaxWeight));
    assert!(heavier.new_records.contains(&RecordKind::EstimatedOneRepMax));

    let detail = tracker.workout_detail(workout.id).await.unwrap();
    assert_eq!(detail.exercises.len(), 1);
    assert_eq!(detail.exercises[0].exercise_name, "Deadlift");
    assert_eq!(detail.set_count(), 8);
    assert_eq!(detail.workout.total_volume, 1500.0 + 360.0 + 1170.0);
}

async fn log_on(tracker: &Tracker, exercise_id: i64, date: NaiveDate, weight: f64) -> LoggedSet {
    let workout_id = record_on(tracker, date).await;
    let instance = tracker.add_exercise(workout_id, exercise_id).await.unwrap();
    tracker.log_set(instance.id, &set(weight, 5)).await.unwrap()
}

#[tokio::test]
async fn backfilled_sets_only_compete_with_earlier_history() {
    let tracker = tracker().await;
    let deadlift = tracker.find_exercise("Deadlift").await.unwrap().unwrap().id;
    let day = |d| NaiveDate::from_ymd_opt(2026, 3, d).unwrap();

    log_on(&tracker, deadlift, day(1), 100.0).await;
    let later = log_on(&tracker, deadlift, day(3), 120.0).await;
    assert!(later.new_records.contains(&RecordKind::MaxWeight));

    let backfilled = log_on(&tracker, deadlift, day(2), 110.0).await;
    assert_eq!(
        backfilled.new_records,
        vec![
            RecordKind::MaxWeight,
            RecordKind::MaxVolume,
            RecordKind::EstimatedOneRepMax
        ]
    );
}

#[tokio::test]
async fn logging_needs_an_active_workout() {
    let tracker = tracker().await;
    let err = tracker
        .log_sets_by_name("Deadlift", &set(100.0, 5), 1)
        .await
        .unwrap_err();
    assert_eq!(tracker_error(&err), Some(&TrackerError::NoActiveWorkout));
}

#[tokio::test]
async fn invalid_sets_are_rejected() {
    let tracker = tracker().await;
    tracker.start_workout(None).await.unwrap();
    let err = tracker
        .log_sets_by_name("Deadlift", &set(-5.0, 5), 1)
        .await
        .unwrap_err();
    assert!(matches!(
        tracker_error(&err),
        Some(TrackerError::InvalidValue { field: "weight", .. })
    ));

    let err = tracker
        .log_sets_by_name("Deadlift", &set(f64::NAN, 5), 1)
        .await
        .unwrap_err();
    assert!(matches!(
        tracker_error(&err),
        Some(TrackerError::InvalidValue { field: "weight", reason })
            if reason.contains("not a finite non-negative number")
    ));
}

#[tokio::test]
async fn deleting_a_set_closes_the_gap() {
    let tracker = tracker().await;
    let workout = tracker.start_workout(None).await.unwrap();
    let logged = tracker
        .log_sets_by_name("Overhead Press", &set(50.0, 10), 3)
        .await
        .unwrap();
    let instance_id = logged.sets[0].exercise_instance_id;

    tracker.delete_set(logged.sets[1].id).await.unwrap();

    let remaining = tracker.sets(instance_id).await.unwrap();
    let ids: Vec<i64> = remaining.iter().map(|s| s.id).collect();
    let numbers: Vec<i64> = remaining.iter().map(|s| s.set_number).collect();
    assert_eq!(ids, vec![logged.sets[0].id, logged.sets[2].id]);
    assert_eq!(numbers, vec![1, 2]);
    assert_eq!(tracker.get_workout(workout.id).await.unwrap().total_volume, 1000.0);
}

#[tokio::test]
async fn moving_and_removing_exercises_keeps_order_contiguous() {
    let tracker = tracker().await;
    let workout = tracker.start_workout(None).await.unwrap();
    let squat = tracker.find_exercise("Barbell Back Squat").await.unwrap().unwrap();
    let bench = tracker.find_exercise("Barbell Bench Press").await.unwrap().unwrap();
    let row = tracker.find_exercise("Barbell Row").await.unwrap().unwrap();

    let a = tracker.add_exercise(workout.id, squat.id).await.unwrap();
    let b = tracker.add_exercise(workout.id, bench.id).await.unwrap();
    let c = tracker.add_exercise(workout.id, row.id).await.unwrap();
    assert_eq!(
        (a.order_in_workout, b.order_in_workout, c.order_in_workout),
        (1, 2, 3)
    );

    tracker.move_exercise(c.id, 1).await.unwrap();
    let order: Vec<(i64, i64)> = tracker
        .instances(workout.id)
        .await
        .unwrap()
        .iter()
        .map(|i| (i.id, i.order_in_workout))
        .collect();
    assert_eq!(order, vec![(c.id, 1), (a.id, 2), (b.id, 3)]);

    tracker.move_exercise(c.id, 10).await.unwrap();
    tracker.remove_exercise(a.id).await.unwrap();
    let order: Vec<(i64, i64)> = tracker
        .instances(workout.id)
        .await
        .unwrap()
        .iter()
        .map(|i| (i.id, i.order_in_workout))
        .collect();
    assert_eq!(order, vec![(b.id, 1), (c.id, 2)]);

    assert!(tracker.move_exercise(b.id, 0).await.is_err());
}

#[tokio::test]
async fn deleting_a_workout_removes_everything_in_it() {
    let tracker = tracker().await;
    let workout = tracker.start_workout(None).await.unwrap();
    tracker
        .log_sets_by_name("Pull Up", &set(0.0, 10), 3)
        .await
        .unwrap();

    assert_eq!(tracker.delete_workout(workout.id).await.unwrap(), 1);
    assert_eq!(tracker.get_workout_id().await, None);

    let sets: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM exercise_sets")
        .fetch_one(tracker.pool())
        .await
        .unwrap();
    let instances: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM exercise_instances")
        .fetch_one(tracker.pool())
        .await
        .unwrap();
    assert_eq!((sets, instances), (0, 0));
    assert!(tracker.check_integrity().await.unwrap().is_clean());
}

#[tokio::test]
async fn starting_a_workout_finishes_the_previous_one() {
    let tracker = tracker().await;
    let first = tracker.start_workout(Some("First")).await.unwrap();
    let second = tracker.start_workout(Some("Second")).await.unwrap();

    assert!(!tracker.get_workout(first.id).await.unwrap().is_in_progress());
    assert_eq!(tracker.get_workout_id().await, Some(second.id));

    let finished = tracker.finish_workout(Some(4)).await.unwrap();
    assert_eq!(finished.rating, Some(4));
    assert_eq!(tracker.get_workout_id().await, None);
    assert_eq!(tracker.list_workouts(true).await.unwrap().len(), 2);
}

#[tokio::test]
async fn reopening_resumes_the_in_progress_workout() {
    let tracker = tracker().await;
    let workout = tracker.start_workout(None).await.unwrap();
    let pool = tracker.pool().clone();

    let reopened = Tracker::from_pool(pool).await.unwrap();
    assert_eq!(reopened.get_workout_id().await, Some(workout.id));
}

#[tokio::test]
async fn exercise_cache_follows_writes() {
    let tracker = tracker().await;
    assert_eq!(tracker.exercises().await.unwrap().len(), 8);

    let front = tracker
        .create_exercise(&NewExercise {
            name: "Front Squat".into(),
            category: Some("strength".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(front.is_custom);
    assert_eq!(tracker.exercises().await.unwrap().len(), 9);

    tracker.rename_exercise(front.id, "Zercher Squat").await.unwrap();
    let names: Vec<String> = tracker
        .exercises()
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert!(names.contains(&"Zercher Squat".to_string()));
    assert!(!names.contains(&"Front Squat".to_string()));

    tracker.delete_exercise(front.id).await.unwrap();
    assert_eq!(tracker.exercises().await.unwrap().len(), 8);
    let err = tracker.exercise(front.id).await.unwrap_err();
    assert!(matches!(tracker_error(&err), Some(TrackerError::NotFound { .. })));
}

#[tokio::test]
async fn exercises_in_use_cannot_be_deleted() {
    let tracker = tracker().await;
    tracker.start_workout(None).await.unwrap();
    let logged = tracker
        .log_sets_by_name("Dumbbell Curl", &set(15.0, 12), 1)
        .await
        .unwrap();
    let curl = tracker.find_exercise("dumbbell curl").await.unwrap().unwrap();
    assert_eq!(logged.sets.len(), 1);

    let err = tracker.delete_exercise(curl.id).await.unwrap_err();
    assert_eq!(tracker_error(&err), Some(&TrackerError::ExerciseInUse(curl.id)));
}

#[tokio::test]
async fn templates_prefill_workouts() {
    let tracker = tracker().await;
    let squat = tracker.find_exercise("Barbell Back Squat").await.unwrap().unwrap();
    let press = tracker.find_exercise("Overhead Press").await.unwrap().unwrap();

    let template = tracker.create_template("Legs and shoulders", None).await.unwrap();
    tracker
        .add_template_exercise(template.id, squat.id, 5, 5, Some(100.0))
        .await
        .unwrap();
    let second = tracker
        .add_template_exercise(template.id, press.id, 3, 8, None)
        .await
        .unwrap();
    assert_eq!(second.order_in_template, 2);

    let detail = tracker.start_workout_from_template(template.id).await.unwrap();
    assert_eq!(detail.workout.template_id, Some(template.id));
    assert_eq!(tracker.get_workout_id().await, Some(detail.workout.id));
    let plan: Vec<(&str, usize)> = detail
        .exercises
        .iter()
        .map(|e| (e.exercise_name.as_str(), e.sets.len()))
        .collect();
    assert_eq!(plan, vec![("Barbell Back Squat", 5), ("Overhead Press", 3)]);
    assert_eq!(detail.workout.total_volume, 2500.0);

    tracker.delete_template(template.id).await.unwrap();
    let workout = tracker.get_workout(detail.workout.id).await.unwrap();
    assert_eq!(workout.template_id, None);
    assert!(tracker.templates().await.unwrap().is_empty());
    assert!(tracker.delete_template(template.id).await.is_err());
}

#[tokio::test]
async fn frequency_goal_completes() {
    let tracker = tracker().await;
    let earlier_today = Utc::now().timestamp() - 3600;
    tracker
        .record_workout(&NewWorkout {
            name: "Morning run".into(),
            date: Utc::now().date_naive(),
            started_at: earlier_today,
            ended_at: Some(earlier_today + 1800),
            notes: None,
            template_id: None,
        })
        .await
        .unwrap();

    let goal = tracker
        .create_goal(GoalType::Frequency, None, "Two sessions", 2.0, None)
        .await
        .unwrap();
    assert_eq!(goal.start_value, 0.0);
    let goals = tracker.refresh_goals().await.unwrap();
    assert_eq!(goals[0].current_value, 0.0);

    tracker.start_workout(None).await.unwrap();
    let goals = tracker.refresh_goals().await.unwrap();
    assert_eq!(goals[0].current_value, 1.0);
    assert!(!goals[0].is_completed);

    tracker.start_workout(None).await.unwrap();
    let goals = tracker.refresh_goals().await.unwrap();
    assert!(goals[0].is_completed);
    assert!(tracker.goals(false).await.unwrap().is_empty());
    assert_eq!(tracker.goals(true).await.unwrap().len(), 1);
}

#[tokio::test]
async fn body_weight_goal_tracks_latest_entry() {
    let tracker = tracker().await;
    let err = tracker
        .create_goal(GoalType::BodyWeight, None, "Cut", 75.0, None)
        .await
        .unwrap_err();
    assert!(matches!(tracker_error(&err), Some(TrackerError::InvalidValue { .. })));

    let today = Utc::now().date_naive();
    tracker.log_weight(80.0, today - Duration::days(1), None).await.unwrap();
    let goal = tracker
        .create_goal(GoalType::BodyWeight, None, "Cut", 75.0, Some(today + Duration::days(60)))
        .await
        .unwrap();
    assert_eq!(goal.start_value, 80.0);

    tracker.log_weight(77.0, today, None).await.unwrap();
    let goals = tracker.refresh_goals().await.unwrap();
    assert_eq!(goals[0].current_value, 77.0);
    assert!((goals[0].progress() - 0.6).abs() < 1e-9);

    tracker.delete_goal(goal.id).await.unwrap();
    assert!(tracker.delete_goal(goal.id).await.is_err());
}

#[tokio::test]
async fn strength_goal_needs_an_exercise() {
    let tracker = tracker().await;
    let err = tracker
        .create_goal(GoalType::Strength, None, "Big lift", 200.0, None)
        .await
        .unwrap_err();
    assert!(matches!(tracker_error(&err), Some(TrackerError::InvalidValue { .. })));

    tracker.start_workout(None).await.unwrap();
    tracker
        .log_sets_by_name("Deadlift", &set(140.0, 5), 1)
        .await
        .unwrap();
    let deadlift = tracker.find_exercise("Deadlift").await.unwrap().unwrap();
    let goal = tracker
        .create_goal(GoalType::Strength, Some(deadlift.id), "Two plates", 180.0, None)
        .await
        .unwrap();
    assert_eq!(goal.start_value, 140.0);
}

#[tokio::test]
async fn weight_history_and_trend() {
    let tracker = tracker().await;
    let today = Local::now().date_naive();
    assert!(tracker.weight_trend(today).await.unwrap().is_none());
    assert!(tracker.log_weight(0.0, today, None).await.is_err());

    tracker.log_weight(80.0, today - Duration::days(40), None).await.unwrap();
    let latest = tracker.log_weight(82.0, today - Duration::days(5), None).await.unwrap();

    let history = tracker.weight_history().await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].weight, 82.0);
    assert_eq!(tracker.latest_weight().await.unwrap().unwrap().weight, 82.0);

    let trend = tracker.weight_trend(today).await.unwrap().unwrap();
    assert_eq!(trend.direction, TrendDirection::Up);

    tracker.delete_weight_entry(latest.id).await.unwrap();
    assert_eq!(tracker.latest_weight().await.unwrap().unwrap().weight, 80.0);
}

#[tokio::test]
async fn analytics_over_recorded_history() {
    let tracker = tracker().await;
    let today = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
    let squat = tracker.find_exercise("Barbell Back Squat").await.unwrap().unwrap();

    for (days_back, weight) in [(9, 100.0), (2, 110.0), (1, 115.0), (0, 112.5)] {
        let workout_id = record_on(&tracker, today - Duration::days(days_back)).await;
        let instance = tracker.add_exercise(workout_id, squat.id).await.unwrap();
        tracker.log_set(instance.id, &set(weight, 5)).await.unwrap();
    }

    let streak = tracker.streak(today).await.unwrap();
    assert_eq!(streak.current, 3);
    assert_eq!(streak.longest, 3);
    assert!(streak.is_active);

    let comparison = tracker.compare_periods(today, 7).await.unwrap();
    assert_eq!(comparison.current.workout_count, 3);
    assert_eq!(comparison.previous.workout_count, 1);
    assert_eq!(comparison.volume_trend.direction, TrendDirection::Up);

    let improvement = tracker.most_improved(today, 7).await.unwrap().unwrap();
    assert_eq!(improvement.exercise_id, squat.id);
    assert_eq!(improvement.gain, 15.0);

    let weeks = tracker.weekly_volume(2, today).await.unwrap();
    assert_eq!(weeks.len(), 2);
    assert_eq!(weeks[1].volume, (110.0 + 115.0 + 112.5) * 5.0);
    assert_eq!(weeks[0].volume, 500.0);

    let records = tracker.personal_records(Some(squat.id)).await.unwrap();
    let max_weight = records
        .iter()
        .find(|r| r.kind == RecordKind::MaxWeight)
        .unwrap();
    assert_eq!(max_weight.value, 115.0);
    assert_eq!(max_weight.achieved_on, today - Duration::days(1));
}
