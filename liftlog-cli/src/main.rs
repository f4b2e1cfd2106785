use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use liftlog::db;
use liftlog::db::operations::{delete_workout, get_all_workouts, get_workout, insert_workout};
use liftlog::logging;
use liftlog::progress::{
    WorkoutProgressIntent, WorkoutProgressSignal, WorkoutProgressState, WorkoutProgressStore,
};
use liftlog::repository::WorkoutRepository;
use liftlog::workout::Workout;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

#[derive(Parser, Debug)]
#[command(version, about = "Liftlog - Workout Tracker CLI", long_about = None)]
struct Args {
    /// SQLite database file. Falls back to DATABASE_URL.
    #[arg(short, long)]
    database: Option<String>,
    /// off, error, warn, info, debug or trace
    #[arg(long)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Import a workout plan from a JSON file
    Import { file: PathBuf },
    /// List all workouts from the database
    ListWorkouts {
        #[arg(short, long)]
        verbose: bool,
    },
    /// Print one workout with its sets
    Show { workout_id: String },
    Delete { workout_id: String },
    /// Interactive workout tracking
    Track { workout_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Row {
    Exercise(usize),
    Set(usize, usize),
}

/// Sets are listed under the current exercise and under exercises in preview
/// mode; every other exercise is collapsed to one line.
fn visible_rows(workout: &Workout) -> Vec<Row> {
    let mut rows = Vec::new();
    for (e_idx, exercise) in workout.exercises.iter().enumerate() {
        rows.push(Row::Exercise(e_idx));
        if exercise.is_current || exercise.is_in_preview_mode {
            rows.extend((0..exercise.sets.len()).map(|s_idx| Row::Set(e_idx, s_idx)));
        }
    }
    rows
}

fn toggle_intent(workout: &Workout, row: Row) -> Option<WorkoutProgressIntent> {
    match row {
        Row::Exercise(e_idx) => {
            let exercise = workout.exercises.get(e_idx)?;
            Some(WorkoutProgressIntent::ToggleExerciseStatus {
                exercise_id: exercise.id.clone(),
            })
        }
        Row::Set(e_idx, s_idx) => {
            let exercise = workout.exercises.get(e_idx)?;
            let set = exercise.sets.get(s_idx)?;
            Some(WorkoutProgressIntent::ToggleSetStatus {
                exercise_id: exercise.id.clone(),
                set_id: set.id.clone(),
            })
        }
    }
}

fn row_exercise_id(workout: &Workout, row: Row) -> Option<String> {
    let (Row::Exercise(e_idx) | Row::Set(e_idx, _)) = row;
    workout.exercises.get(e_idx).map(|e| e.id.clone())
}

fn status_line(state: &WorkoutProgressState) -> String {
    if state.is_loading {
        "Loading workout...".to_string()
    } else if state.is_error {
        "Could not load workout. q: quit".to_string()
    } else if state.is_saving {
        "Saving workout...".to_string()
    } else if state.save_failed {
        "Saving failed. f: retry | q: quit".to_string()
    } else {
        "j/k: navigate | space: toggle | e: toggle exercise | p: preview | c: complete all | f: finish | q: quit"
            .to_string()
    }
}

enum TrackOutcome {
    Finished,
    Quit,
}

struct Tracker {
    selected: usize,
}

impl Tracker {
    fn scroll_down(&mut self, len: usize) {
        if len > 0 && self.selected < len - 1 {
            self.selected += 1;
        }
    }

    fn scroll_up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    fn clamp(&mut self, len: usize) {
        if self.selected >= len && len > 0 {
            self.selected = len - 1;
        }
    }
}

fn draw_tracker(frame: &mut Frame, state: &WorkoutProgressState, rows: &[Row], selected: usize) {
    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(1),
        Constraint::Length(3),
    ])
    .split(frame.area());

    // Header
    let workout = &state.workout;
    let title = if workout.name.is_empty() {
        format!("Workout {}", workout.id)
    } else {
        workout.name.clone()
    };
    let header = Paragraph::new(format!(
        "{} - {}/{} sets",
        title,
        workout.completed_set_count(),
        workout.total_set_count()
    ))
    .style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, chunks[0]);

    if rows.is_empty() {
        let empty_msg = Paragraph::new(if state.is_loading { "" } else { "No exercises." })
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL).title("Exercises"));
        frame.render_widget(empty_msg, chunks[1]);
    } else {
        let items: Vec<ListItem> = rows
            .iter()
            .enumerate()
            .map(|(idx, row)| {
                let (content, mut style) = match *row {
                    Row::Exercise(e_idx) => {
                        let exercise = &workout.exercises[e_idx];
                        let marker = if exercise.is_current { ">" } else { " " };
                        let done = if exercise.is_complete() { "x" } else { " " };
                        let style = if exercise.is_current {
                            Style::default().fg(Color::Yellow)
                        } else if exercise.is_complete() {
                            Style::default().fg(Color::DarkGray)
                        } else {
                            Style::default()
                        };
                        (
                            format!(
                                "{} [{}] {} ({}/{})",
                                marker,
                                done,
                                exercise.name,
                                exercise.completed_set_count(),
                                exercise.sets.len()
                            ),
                            style,
                        )
                    }
                    Row::Set(e_idx, s_idx) => {
                        let set = &workout.exercises[e_idx].sets[s_idx];
                        (format!("      {}", set), Style::default().fg(Color::Gray))
                    }
                };
                if idx == selected {
                    style = Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD);
                }
                ListItem::new(content).style(style)
            })
            .collect();

        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Exercises ({} total)", workout.exercises.len())),
        );

        let mut list_state = ListState::default();
        list_state.select(Some(selected));

        frame.render_stateful_widget(list, chunks[1], &mut list_state);
    }

    // Footer with status
    let footer_style = if state.is_error || state.save_failed {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::White)
    };
    let footer = Paragraph::new(status_line(state))
        .style(footer_style)
        .block(Block::default().borders(Borders::ALL).title("Status"));
    frame.render_widget(footer, chunks[2]);
}

async fn run_tracker(
    mut terminal: DefaultTerminal,
    store: &WorkoutProgressStore,
) -> Result<TrackOutcome> {
    let mut tracker = Tracker { selected: 0 };

    loop {
        if let Some(WorkoutProgressSignal::NavigateHome) = store.try_next_signal() {
            return Ok(TrackOutcome::Finished);
        }

        let state = store.state();
        let rows = visible_rows(&state.workout);
        tracker.clamp(rows.len());
        terminal.draw(|frame| draw_tracker(frame, &state, &rows, tracker.selected))?;

        // Poll so load and save results show up without a key press.
        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        let row = rows.get(tracker.selected).copied();
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                return Ok(TrackOutcome::Quit);
            }
            KeyCode::Char('j') | KeyCode::Down => {
                tracker.scroll_down(rows.len());
            }
            KeyCode::Char('k') | KeyCode::Up => {
                tracker.scroll_up();
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(intent) = row.and_then(|r| toggle_intent(&state.workout, r)) {
                    store.dispatch(intent)?;
                }
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                if let Some(exercise_id) = row.and_then(|r| row_exercise_id(&state.workout, r)) {
                    store.dispatch(WorkoutProgressIntent::ToggleExerciseStatus { exercise_id })?;
                }
            }
            KeyCode::Char('p') | KeyCode::Char('P') => {
                if let Some(exercise_id) = row.and_then(|r| row_exercise_id(&state.workout, r)) {
                    store.dispatch(WorkoutProgressIntent::ToggleExercisePreview { exercise_id })?;
                }
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                store.dispatch(WorkoutProgressIntent::CompleteWorkout)?;
            }
            KeyCode::Char('f') | KeyCode::Char('F') => {
                store.dispatch(WorkoutProgressIntent::FinishWorkout)?;
            }
            _ => {}
        }
    }
}

fn print_workout(workout: &Workout) {
    println!(
        "{}, {} ({}/{} sets done)",
        workout.id,
        workout.name,
        workout.completed_set_count(),
        workout.total_set_count()
    );
    for exercise in &workout.exercises {
        println!("\t{} ({})", exercise.name, exercise.id);
        for set in &exercise.sets {
            println!("\t\t{}", set);
        }
    }
}

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();

    if let Some(level) = &args.log_level {
        if !logging::set_log_level(level) {
            anyhow::bail!("Unknown log level: {}", level);
        }
    }
    if let Some(path) = &args.database {
        db::set_db_path(path)?;
    }
    let db_path = db::get_db_path()?;

    match args.command {
        Commands::Import { file } => {
            let json = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let mut workout = Workout::from_json(&json)?;
            if workout.id.trim().is_empty() {
                workout.id = uuid::Uuid::new_v4().to_string();
            }
            workout.assign_missing_ids()?;

            let pool = db::open(&db_path)?;
            insert_workout(&mut *pool.get()?, &workout)?;
            info!("Imported {} from {}", workout.id, file.display());
            println!("Imported workout {}", workout.id);
            Ok(())
        }
        Commands::ListWorkouts { verbose } => {
            let pool = db::open(&db_path)?;
            let mut conn = pool.get()?;
            let workouts = get_all_workouts(&mut conn)?;
            if workouts.is_empty() {
                println!("No workouts found. Import one with `liftlog import <plan.json>`");
            }
            for row in workouts {
                println!("{}", row);
                if verbose {
                    if let Some(workout) = get_workout(&mut conn, &row.id)? {
                        for exercise in &workout.exercises {
                            println!("\t{}", exercise.name);
                            for set in &exercise.sets {
                                println!("\t\t{}", set);
                            }
                        }
                    }
                }
            }
            Ok(())
        }
        Commands::Show { workout_id } => {
            let pool = db::open(&db_path)?;
            match get_workout(&mut *pool.get()?, &workout_id)? {
                Some(workout) => print_workout(&workout),
                None => println!("Workout {} not found", workout_id),
            }
            Ok(())
        }
        Commands::Delete { workout_id } => {
            let pool = db::open(&db_path)?;
            let deleted = delete_workout(&mut *pool.get()?, &workout_id)?;
            if deleted == 0 {
                println!("Workout {} not found", workout_id);
            } else {
                println!("Deleted workout {}", workout_id);
            }
            Ok(())
        }
        Commands::Track { workout_id } => {
            let repository = Arc::new(WorkoutRepository::open_sqlite(&db_path)?);
            let store = WorkoutProgressStore::spawn(repository, WorkoutProgressState::default())?;
            store.load(&workout_id)?;

            let terminal = ratatui::init();
            let result = run_tracker(terminal, &store).await;
            ratatui::restore();
            store.shutdown().await;

            match result? {
                TrackOutcome::Finished => println!("Workout {} saved.", workout_id),
                TrackOutcome::Quit => println!("Left workout {} without finishing.", workout_id),
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftlog::workout::{Exercise, WorkoutSet};

    fn sample() -> Workout {
        let set = |id: &str| WorkoutSet {
            id: id.to_string(),
            ..Default::default()
        };
        Workout {
            id: "w1".into(),
            name: "Full body".into(),
            exercises: vec![
                Exercise {
                    id: "e1".into(),
                    name: "Squat".into(),
                    sets: vec![set("s1"), set("s2")],
                    is_current: true,
                    ..Default::default()
                },
                Exercise {
                    id: "e2".into(),
                    name: "Press".into(),
                    sets: vec![set("s3")],
                    ..Default::default()
                },
                Exercise {
                    id: "e3".into(),
                    name: "Row".into(),
                    sets: vec![set("s4")],
                    is_in_preview_mode: true,
                    ..Default::default()
                },
            ],
        }
    }

    #[test]
    fn only_current_and_previewed_exercises_expand() {
        let rows = visible_rows(&sample());
        assert_eq!(
            rows,
            vec![
                Row::Exercise(0),
                Row::Set(0, 0),
                Row::Set(0, 1),
                Row::Exercise(1),
                Row::Exercise(2),
                Row::Set(2, 0),
            ]
        );
    }

    #[test]
    fn rows_map_to_toggle_intents() {
        let workout = sample();
        assert_eq!(
            toggle_intent(&workout, Row::Set(0, 1)),
            Some(WorkoutProgressIntent::ToggleSetStatus {
                exercise_id: "e1".into(),
                set_id: "s2".into(),
            })
        );
        assert_eq!(
            toggle_intent(&workout, Row::Exercise(1)),
            Some(WorkoutProgressIntent::ToggleExerciseStatus {
                exercise_id: "e2".into(),
            })
        );
        assert_eq!(toggle_intent(&workout, Row::Set(1, 5)), None);
        assert_eq!(row_exercise_id(&workout, Row::Set(2, 0)), Some("e3".into()));
    }

    #[test]
    fn tracker_stays_in_bounds() {
        let mut tracker = Tracker { selected: 0 };
        tracker.scroll_up();
        assert_eq!(tracker.selected, 0);
        tracker.scroll_down(2);
        tracker.scroll_down(2);
        assert_eq!(tracker.selected, 1);
        tracker.clamp(1);
        assert_eq!(tracker.selected, 0);
    }
}
