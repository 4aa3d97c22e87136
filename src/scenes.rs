//! # Scene Management
//!
//! The main menu and the transitions out of it: building maps, loading
//! saves and handing a game to a [`Session`]. When a session ends the menu
//! comes back.

use crate::game::{load_game, read_map, save_map, GameState, RoomGraph};
use crate::generation::{
    utils::create_rng, DirTreeGenerator, GenerationConfig, Generator, RandomGraphGenerator,
};
use crate::input::{InputHandler, MenuCommand};
use crate::rendering::{render_menu, report_failure, report_success, MAIN_MENU};
use crate::session::{Session, SessionConfig};
use crate::WarrenResult;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Write;
use std::path::Path;
use tokio::io::AsyncBufRead;

/// Which screen the player is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneType {
    MainMenu,
    Exiting,
}

/// Runs the main menu until `exit` or end of input.
#[derive(Debug)]
pub struct SceneManager {
    current_scene: SceneType,
    session_config: SessionConfig,
    rng: StdRng,
}

impl SceneManager {
    pub fn new(session_config: SessionConfig) -> Self {
        let rng = match session_config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            current_scene: SceneType::MainMenu,
            session_config,
            rng,
        }
    }

    pub fn current_scene(&self) -> SceneType {
        self.current_scene
    }

    /// Runs the menu loop. Only fatal session errors are returned; a bad
    /// map or save path is reported and the menu continues.
    pub async fn run<R, W>(&mut self, input: &mut InputHandler<R>, out: &mut W) -> WarrenResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        render_menu(out, MAIN_MENU)?;

        while self.current_scene == SceneType::MainMenu {
            let Some(line) = input.next_line().await? else {
                self.current_scene = SceneType::Exiting;
                break;
            };

            match line.parse::<MenuCommand>() {
                Ok(command) => {
                    debug!("Menu command: {:?}", command);
                    self.handle_command(command, input, out).await?;
                }
                Err(e) => {
                    report_failure(out, e)?;
                    render_menu(out, MAIN_MENU)?;
                }
            }
        }
        Ok(())
    }

    async fn handle_command<R, W>(
        &mut self,
        command: MenuCommand,
        input: &mut InputHandler<R>,
        out: &mut W,
    ) -> WarrenResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        match command {
            MenuCommand::ReadMap(path) => match read_map(&path).await {
                Ok(graph) => {
                    let state = GameState::new_game(graph, &mut self.rng)?;
                    self.play(state, input, out).await?;
                }
                Err(e) => report_failure(out, format!("Could not read map {}: {}", path.display(), e))?,
            },

            MenuCommand::LoadGame(path) => match load_game(&path).await {
                Ok(state) => self.play(state, input, out).await?,
                Err(e) => {
                    warn!("Loading {} failed: {}", path.display(), e);
                    report_failure(out, format!("Could not load game {}: {}", path.display(), e))?
                }
            },

            MenuCommand::GenerateRandomMap { vertex_count, out: map_path } => {
                let config = GenerationConfig::new(self.rng.gen(), vertex_count);
                let generated = RandomGraphGenerator::new().generate(&config, &mut create_rng(&config));
                match generated {
                    Ok(graph) => self.store_map(&graph, &map_path, out).await?,
                    Err(e) => report_failure(out, e)?,
                }
            }

            MenuCommand::MapFromDirTree { dir, out: map_path } => {
                let config = GenerationConfig::default();
                let generated = DirTreeGenerator::new(&dir).generate(&config, &mut create_rng(&config));
                match generated {
                    Ok(map) => {
                        report_success(
                            out,
                            format!("{} directories found in {}", map.directories.len(), dir.display()),
                        )?;
                        for (room, directory) in map.directories.iter().enumerate() {
                            debug!("ROOM {} = {}", room, directory.display());
                        }
                        self.store_map(&map.graph, &map_path, out).await?;
                    }
                    Err(e) => report_failure(out, e)?,
                }
            }

            MenuCommand::Exit => {
                info!("Exiting");
                self.current_scene = SceneType::Exiting;
                return Ok(());
            }
        }

        render_menu(out, MAIN_MENU)?;
        Ok(())
    }

    async fn store_map<W: Write>(
        &self,
        graph: &RoomGraph,
        path: &Path,
        out: &mut W,
    ) -> WarrenResult<()> {
        match save_map(graph, path).await {
            Ok(()) => report_success(out, format!("Successfully saved map ({}).", path.display()))?,
            Err(e) => report_failure(out, format!("Could not save the map: {}", e))?,
        }
        Ok(())
    }

    async fn play<R, W>(&mut self, state: GameState, input: &mut InputHandler<R>, out: &mut W) -> WarrenResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let session = Session::start(state, self.session_config.clone())?;
        let finished = session.run(input, out).await?;
        info!(
            "Game over with {} of {} items accounted for",
            finished.total_item_count(),
            finished.expected_item_count()
        );
        Ok(())
    }
}
