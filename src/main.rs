mod app;
mod engine;
mod source;
mod util;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON graph description to visualize.
    #[arg(long, default_value = "graph.json")]
    graph_file: String,
}

fn main() -> eframe::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "linkscope",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::LinkscopeApp::new(
                cc,
                args.graph_file.clone(),
            )))
        }),
    )
}
