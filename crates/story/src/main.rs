use gpui::*;
use gpui_component::Root;

use gpui_manos_blocks_story::blocks::BlocksStory;
use gpui_manos_blocks_story::{init_tracing, load_config};

fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = load_config()?;
    let app = Application::new();

    app.run(move |cx| {
        gpui_component::init(cx);
        gpui_manos_blocks::init(cx);
        cx.activate(true);

        cx.spawn(async move |cx| {
            cx.open_window(
                WindowOptions {
                    titlebar: Some(TitlebarOptions {
                        title: Some("Manos Blocks".into()),
                        appears_transparent: false,
                        traffic_light_position: None,
                    }),
                    ..Default::default()
                },
                |window, cx| {
                    let view = BlocksStory::view(config, window, cx);
                    cx.new(|cx| Root::new(view, window, cx))
                },
            )?;

            Ok::<_, anyhow::Error>(())
        })
        .detach();
    });

    Ok(())
}
